use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sync::SyncReport;

/// One completed sync run, stored as a JSON line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub timestamp: DateTime<Utc>,
    pub source_playlist_id: String,
    pub destination_title: String,
    pub dry_run: bool,
    pub report: SyncReport,
}

impl RunRecord {
    pub fn new(
        source_playlist_id: &str,
        destination_title: &str,
        dry_run: bool,
        report: SyncReport,
    ) -> Self {
        RunRecord {
            timestamp: Utc::now(),
            source_playlist_id: source_playlist_id.to_string(),
            destination_title: destination_title.to_string(),
            dry_run,
            report,
        }
    }

    pub fn journal_path(state_dir: &Path) -> PathBuf {
        state_dir.join("history.jsonl")
    }

    pub fn append(path: &Path, record: &RunRecord) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open journal {:?}", path))?;

        let line = serde_json::to_string(record).context("Failed to serialize run record")?;

        writeln!(file, "{}", line).context("Failed to write to journal")
    }

    pub fn read_all(path: &Path) -> anyhow::Result<Vec<RunRecord>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read journal {:?}", path))?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Corrupt journal entry on line {}", i + 1))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn report(added: usize) -> SyncReport {
        SyncReport {
            total_tracks: 2,
            added,
            skipped_duplicate: 2 - added,
            failed_to_match: 0,
            failed_to_add: 0,
        }
    }

    #[test]
    fn test_append_and_read_all() {
        let temp = TempDir::new().unwrap();
        let path = RunRecord::journal_path(temp.path());

        let first = RunRecord::new("sp1", "Road Trip", false, report(2));
        let second = RunRecord::new("sp1", "Road Trip", false, report(0));
        RunRecord::append(&path, &first).unwrap();
        RunRecord::append(&path, &second).unwrap();

        let records = RunRecord::read_all(&path).unwrap();
        assert_eq!(records, vec![first, second]);
    }

    #[test]
    fn test_read_missing_journal() {
        let temp = TempDir::new().unwrap();
        let records = RunRecord::read_all(&RunRecord::journal_path(temp.path())).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_corrupt_line_reports_position() {
        let temp = TempDir::new().unwrap();
        let path = RunRecord::journal_path(temp.path());
        RunRecord::append(&path, &RunRecord::new("sp1", "T", true, report(1))).unwrap();
        fs::write(&path, format!("{}not json\n", fs::read_to_string(&path).unwrap())).unwrap();

        let err = RunRecord::read_all(&path).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
