use std::fmt;

use serde::{Deserialize, Serialize};

/// What happened to a single source track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    Added,
    SkippedDuplicate,
    FailedToMatch,
    FailedToAdd,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub total_tracks: usize,
    pub added: usize,
    pub skipped_duplicate: usize,
    pub failed_to_match: usize,
    pub failed_to_add: usize,
}

impl SyncReport {
    pub fn new(total_tracks: usize) -> Self {
        Self {
            total_tracks,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: TrackOutcome) {
        match outcome {
            TrackOutcome::Added => self.added += 1,
            TrackOutcome::SkippedDuplicate => self.skipped_duplicate += 1,
            TrackOutcome::FailedToMatch => self.failed_to_match += 1,
            TrackOutcome::FailedToAdd => self.failed_to_add += 1,
        }
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processed: {}", self.total_tracks)?;
        writeln!(f, "Added: {}", self.added)?;
        writeln!(f, "Skipped (dupes): {}", self.skipped_duplicate)?;
        writeln!(f, "Failed to match: {}", self.failed_to_match)?;
        write!(f, "Failed to add: {}", self.failed_to_add)
    }
}
