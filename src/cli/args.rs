use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::provider::ProviderKind;
use crate::state::{AuthMode, Config};

/// tubesync - mirror a Spotify playlist into a YouTube playlist
///
/// Each track is searched on YouTube, the best hit is added to the
/// destination playlist, and anything already there is left alone.
#[derive(Parser, Debug)]
#[command(name = "tubesync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Where config, credentials and run history live
    #[arg(long, global = true, env = "TUBESYNC_STATE_DIR", default_value = ".tubesync")]
    pub state_dir: PathBuf,

    /// Log filter, e.g. `info` or `tubesync=debug` (falls back to RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remember the source playlist (and destination title) in config.toml
    Init {
        /// Playlist URL or ID (e.g., https://open.spotify.com/playlist/37i9... or 37i9...)
        playlist: String,
        /// Title of the YouTube playlist to sync into
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Copy the source playlist into the destination playlist
    Sync(SyncArgs),
    /// Run the authorization flow for a provider again
    Auth {
        /// Provider to authenticate
        provider: ProviderKind,
    },
    /// Delete the saved refresh token for a provider
    Logout {
        /// Provider to logout from
        provider: ProviderKind,
    },
    /// Show recent sync runs
    History {
        /// Number of runs to show
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
}

/// Per-run overrides on top of config.toml and the environment.
#[derive(Args, Debug, Default, Clone)]
pub struct SyncArgs {
    /// Source playlist URL or ID
    #[arg(short = 'l', long)]
    pub playlist: Option<String>,

    /// Destination playlist title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Stop after this many source tracks
    #[arg(long)]
    pub max_tracks: Option<usize>,

    /// Search results to consider per track (1-50)
    #[arg(long)]
    pub max_results: Option<u32>,

    /// Report what would be added without touching YouTube
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// How to receive the OAuth redirect
    #[arg(long, value_enum)]
    pub auth_mode: Option<AuthMode>,
}

impl SyncArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(playlist) = &self.playlist {
            config.source_playlist_id = Some(playlist.clone());
        }
        if let Some(title) = &self.title {
            config.destination_title = title.clone();
        }
        if let Some(max_tracks) = self.max_tracks {
            config.max_tracks = max_tracks;
        }
        if let Some(max_results) = self.max_results {
            config.search_max_results = max_results;
        }
        if let Some(mode) = self.auth_mode {
            config.auth_mode = mode;
        }
        // a flag can turn dry run on, never off
        config.dry_run |= self.dry_run;
    }
}
