use std::time::Duration;

use tracing::{debug, info, warn};

use crate::auth::{ProviderSession, TokenManager};
use crate::error::SyncError;
use crate::provider::{DestinationCatalog, DestinationPlaylistState, SourceCatalog, TrackDescriptor};
use crate::sync::report::{SyncReport, TrackOutcome};
use crate::sync::{matcher, reader, resolver};

/// What to sync and how hard to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub source_playlist_id: String,
    pub destination_title: String,
    pub max_tracks: usize,
    pub search_max_results: u32,
    pub dry_run: bool,
}

pub struct SyncOrchestrator<'a> {
    tokens: &'a TokenManager<'a>,
    source: &'a dyn SourceCatalog,
    destination: &'a dyn DestinationCatalog,
}

impl<'a> SyncOrchestrator<'a> {
    pub fn new(
        tokens: &'a TokenManager<'a>,
        source: &'a dyn SourceCatalog,
        destination: &'a dyn DestinationCatalog,
    ) -> Self {
        Self {
            tokens,
            source,
            destination,
        }
    }

    /// Run one sync. Only authorization, source/destination reads and a
    /// failed playlist creation abort; per-track problems end up in the
    /// report.
    pub async fn run(
        &self,
        plan: &SyncPlan,
        source_session: &mut ProviderSession,
        destination_session: &mut ProviderSession,
    ) -> Result<SyncReport, SyncError> {
        let source_token = self
            .tokens
            .access_credential(self.source, source_session)
            .await?;
        let destination_token = self
            .tokens
            .access_credential(self.destination, destination_session)
            .await?;

        let tracks = reader::read_tracks(
            self.source,
            &source_token,
            &plan.source_playlist_id,
            plan.max_tracks,
        )
        .await?;
        info!(tracks = tracks.len(), "read source playlist");

        if tracks.is_empty() {
            return Ok(SyncReport::default());
        }

        let mut playlist = resolver::resolve(
            self.destination,
            &destination_token,
            &plan.destination_title,
            plan.dry_run,
        )
        .await?;

        let mut report = SyncReport::new(tracks.len());
        for track in &tracks {
            let outcome = self
                .sync_track(plan, &destination_token, &mut playlist, track)
                .await;
            debug!(title = %track.title, ?outcome, "track done");
            report.record(outcome);
        }

        info!(
            added = report.added,
            skipped = report.skipped_duplicate,
            unmatched = report.failed_to_match,
            failed = report.failed_to_add,
            "sync finished"
        );
        Ok(report)
    }

    /// [`run`](Self::run), abandoned once `deadline` passes.
    pub async fn run_within(
        &self,
        plan: &SyncPlan,
        source_session: &mut ProviderSession,
        destination_session: &mut ProviderSession,
        deadline: Option<Duration>,
    ) -> Result<SyncReport, SyncError> {
        let run = self.run(plan, source_session, destination_session);
        match deadline {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| SyncError::Deadline(limit))?,
            None => run.await,
        }
    }

    async fn sync_track(
        &self,
        plan: &SyncPlan,
        access_token: &str,
        playlist: &mut DestinationPlaylistState,
        track: &TrackDescriptor,
    ) -> TrackOutcome {
        let item_id = match matcher::find_best_match(
            self.destination,
            access_token,
            track,
            plan.search_max_results,
        )
        .await
        {
            Ok(Some(id)) => id,
            Ok(None) => return TrackOutcome::FailedToMatch,
            Err(err) => {
                warn!(title = %track.title, "search failed: {err:#}");
                return TrackOutcome::FailedToMatch;
            }
        };

        if playlist.existing_item_ids.contains(&item_id) {
            return TrackOutcome::SkippedDuplicate;
        }

        if plan.dry_run {
            info!(title = %track.title, item = %item_id, "would add");
            // later tracks must see it as present, same as a real insert
            playlist.existing_item_ids.insert(item_id);
            return TrackOutcome::Added;
        }

        match self
            .destination
            .insert_item(access_token, &playlist.id, &item_id)
            .await
        {
            Ok(()) => {
                info!(title = %track.title, item = %item_id, "added");
                playlist.existing_item_ids.insert(item_id);
                TrackOutcome::Added
            }
            Err(err) => {
                warn!(title = %track.title, item = %item_id, "insert failed: {err:#}");
                TrackOutcome::FailedToAdd
            }
        }
    }
}
