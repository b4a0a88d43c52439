use std::path::Path;

use anyhow::Result;
use cliclack::{intro, log, outro};

use crate::state::RunRecord;

pub fn run(limit: usize, state_dir: &Path) -> Result<()> {
    let records = RunRecord::read_all(&RunRecord::journal_path(state_dir))?;

    if records.is_empty() {
        outro("No sync runs recorded yet")?;
        return Ok(());
    }

    intro(format!("Last {} of {} runs", limit.min(records.len()), records.len()))?;
    for record in recent(&records, limit) {
        log::info(format_record(record))?;
    }
    outro("Done")?;

    Ok(())
}

/// Newest first.
fn recent(records: &[RunRecord], limit: usize) -> impl Iterator<Item = &RunRecord> {
    records.iter().rev().take(limit)
}

fn format_record(record: &RunRecord) -> String {
    let report = &record.report;
    format!(
        "{}  {} -> {}{}\n  {} tracks: {} added, {} skipped, {} unmatched, {} failed",
        record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        record.source_playlist_id,
        record.destination_title,
        if record.dry_run { " (dry run)" } else { "" },
        report.total_tracks,
        report.added,
        report.skipped_duplicate,
        report.failed_to_match,
        report.failed_to_add,
    )
}
