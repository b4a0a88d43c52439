use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::provider::ProviderKind;

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
const MAX_SEARCH_RESULTS: u32 = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Catch the redirect on a local listener
    #[default]
    Loopback,
    /// Paste the redirected URL by hand
    Paste,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_playlist_id: Option<String>,
    pub destination_title: String,
    pub spotify: ClientConfig,
    pub youtube: ClientConfig,
    pub max_tracks: usize,
    pub search_max_results: u32,
    pub dry_run: bool,
    pub redirect_uri: String,
    pub auth_mode: AuthMode,
    pub reauthorize_on_refresh_failure: bool,
    pub request_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_deadline_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_playlist_id: None,
            destination_title: "Spotify Sync".to_string(),
            spotify: ClientConfig::default(),
            youtube: ClientConfig::default(),
            max_tracks: 500,
            search_max_results: 5,
            dry_run: false,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            auth_mode: AuthMode::Loopback,
            reauthorize_on_refresh_failure: false,
            request_timeout_secs: 30,
            run_deadline_secs: None,
        }
    }
}

impl Config {
    pub fn path(state_dir: &Path) -> PathBuf {
        state_dir.join("config.toml")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML from {:?}", path))
    }

    /// Defaults when the file does not exist yet
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content =
            toml::to_string_pretty(&self).with_context(|| "Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        fs::write(path, content).with_context(|| format!("Failed to write config to {:?}", path))
    }

    /// Fill client credentials from `SPOTIFY_CLIENT_ID` and friends.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let pairs = [
            ("SPOTIFY", &mut self.spotify),
            ("YOUTUBE", &mut self.youtube),
        ];

        for (prefix, client) in pairs {
            if let Some(id) = lookup(&format!("{prefix}_CLIENT_ID")).filter(|v| !v.is_empty()) {
                client.client_id = Some(id);
            }
            if let Some(secret) =
                lookup(&format!("{prefix}_CLIENT_SECRET")).filter(|v| !v.is_empty())
            {
                client.client_secret = Some(secret);
            }
        }
    }

    pub fn client(&self, provider: ProviderKind) -> &ClientConfig {
        match provider {
            ProviderKind::Spotify => &self.spotify,
            ProviderKind::Youtube => &self.youtube,
        }
    }

    /// YouTube rejects `maxResults` outside 1..=50
    pub fn search_results(&self) -> u32 {
        self.search_max_results.clamp(1, MAX_SEARCH_RESULTS)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn run_deadline(&self) -> Option<Duration> {
        self.run_deadline_secs.map(Duration::from_secs)
    }
}
