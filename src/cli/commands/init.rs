use std::path::Path;

use anyhow::Result;
use cliclack::{note, outro};

use super::utils::extract_playlist_id;
use crate::state::Config;

pub fn run(playlist: &str, title: Option<String>, state_dir: &Path) -> Result<()> {
    let config = write_config(playlist, title, state_dir)?;

    note(
        "Configured",
        format!(
            "Source: {}\nDestination: {}",
            config.source_playlist_id.as_deref().unwrap_or_default(),
            config.destination_title
        ),
    )?;
    outro(format!(
        "Saved to {:?}. Run 'tubesync sync' to start.",
        Config::path(state_dir)
    ))?;

    Ok(())
}

/// Merge into an existing config.toml rather than replacing it.
fn write_config(playlist: &str, title: Option<String>, state_dir: &Path) -> Result<Config> {
    let playlist_id = extract_playlist_id(playlist);
    if playlist_id.is_empty() {
        anyhow::bail!("Playlist ID is empty");
    }

    let path = Config::path(state_dir);
    let mut config = Config::load_or_default(&path)?;

    config.source_playlist_id = Some(playlist_id);
    if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
        config.destination_title = title;
    }

    config.save(&path)?;
    Ok(config)
}
