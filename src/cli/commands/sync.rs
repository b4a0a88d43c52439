use std::path::Path;

use anyhow::{Context, Result};
use cliclack::{intro, log, note, outro, outro_cancel};

use super::utils::{
    authorizer, extract_playlist_id, load_config, open_session, spotify_provider, youtube_provider,
};
use crate::auth::TokenManager;
use crate::cli::{SyncArgs, TerminalPrompt};
use crate::provider::{self, ProviderKind};
use crate::state::{Config, FileCredentialStore, RunRecord};
use crate::sync::{SyncOrchestrator, SyncPlan};

pub async fn run(args: SyncArgs, state_dir: &Path) -> Result<()> {
    let mut config = load_config(state_dir)?;
    args.apply(&mut config);
    let plan = plan_from(&config)?;

    intro(if plan.dry_run {
        "Spotify -> YouTube (dry run)"
    } else {
        "Spotify -> YouTube"
    })?;

    let store = FileCredentialStore::new(state_dir);
    let prompt = TerminalPrompt;

    let mut spotify_session = open_session(ProviderKind::Spotify, &config, &store, &prompt)?;
    let mut youtube_session = open_session(ProviderKind::Youtube, &config, &store, &prompt)?;

    let http = provider::http_client(config.request_timeout())?;
    let spotify = spotify_provider(&spotify_session, &http);
    let youtube = youtube_provider(&youtube_session, &http);

    let authorizer = authorizer(&config, &prompt)?;
    let tokens = TokenManager::new(&store, authorizer.as_ref(), config.redirect_uri.clone())
        .reauthorize_on_refresh_failure(config.reauthorize_on_refresh_failure);

    log::step(format!(
        "Syncing {} into '{}'",
        plan.source_playlist_id, plan.destination_title
    ))?;

    let result = SyncOrchestrator::new(&tokens, &spotify, &youtube)
        .run_within(
            &plan,
            &mut spotify_session,
            &mut youtube_session,
            config.run_deadline(),
        )
        .await;

    let report = match result {
        Ok(report) => report,
        Err(err) => {
            outro_cancel("Sync aborted")?;
            return Err(err.into());
        }
    };

    note(
        if plan.dry_run {
            "Sync report (dry run, nothing was added)"
        } else {
            "Sync report"
        },
        report,
    )?;

    let record = RunRecord::new(
        &plan.source_playlist_id,
        &plan.destination_title,
        plan.dry_run,
        report,
    );
    if let Err(err) = RunRecord::append(&RunRecord::journal_path(state_dir), &record) {
        log::warning(format!("Could not record run history: {err:#}"))?;
    }

    outro(if plan.dry_run {
        "Dry run completed"
    } else {
        "Sync completed"
    })?;
    Ok(())
}

fn plan_from(config: &Config) -> Result<SyncPlan> {
    let source_playlist_id = config
        .source_playlist_id
        .as_deref()
        .map(extract_playlist_id)
        .filter(|id| !id.is_empty())
        .context("No source playlist configured. Run 'tubesync init <playlist>' or pass --playlist")?;

    Ok(SyncPlan {
        source_playlist_id,
        destination_title: config.destination_title.clone(),
        max_tracks: config.max_tracks,
        search_max_results: config.search_results(),
        dry_run: config.dry_run,
    })
}
