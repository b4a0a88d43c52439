use std::path::Path;

use anyhow::Result;

use crate::auth::{InteractiveAuthorizer, LoopbackAuthorizer, PasteAuthorizer, ProviderSession};
use crate::provider::{OAuthProvider, ProviderKind, SpotifyProvider, YoutubeProvider};
use crate::state::{AuthMode, Config, CredentialStore, SecretPrompt};

/// Extract playlist ID from URL or URI, or return as-is if already an ID
pub fn extract_playlist_id(input: &str) -> String {
    let input = input.trim();

    // Handle Spotify URLs: https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=...
    if input.contains("spotify.com/") && input.contains("playlist/") {
        return input
            .split("playlist/")
            .nth(1)
            .and_then(|s| s.split(['?', '#', '/']).next())
            .unwrap_or(input)
            .to_string();
    }

    // Handle Spotify URIs: spotify:playlist:37i9dQZF1DXcBWIGoYBM5M
    if let Some(id) = input.strip_prefix("spotify:playlist:") {
        return id.to_string();
    }

    // Already an ID
    input.to_string()
}

/// config.toml with the environment layered on top.
pub fn load_config(state_dir: &Path) -> Result<Config> {
    let mut config = Config::load_or_default(&Config::path(state_dir))?;
    config.apply_env();
    Ok(config)
}

pub fn open_session(
    kind: ProviderKind,
    config: &Config,
    store: &dyn CredentialStore,
    prompt: &dyn SecretPrompt,
) -> Result<ProviderSession> {
    Ok(ProviderSession::load(kind, config.client(kind), store, prompt)?)
}

pub fn spotify_provider(session: &ProviderSession, http: &reqwest::Client) -> SpotifyProvider {
    SpotifyProvider::new(
        session.client_id.clone(),
        session.client_secret.clone(),
        http.clone(),
    )
}

pub fn youtube_provider(session: &ProviderSession, http: &reqwest::Client) -> YoutubeProvider {
    YoutubeProvider::new(
        session.client_id.clone(),
        session.client_secret.clone(),
        http.clone(),
    )
}

pub fn oauth_provider(session: &ProviderSession, http: &reqwest::Client) -> Box<dyn OAuthProvider> {
    match session.kind {
        ProviderKind::Spotify => Box::new(spotify_provider(session, http)),
        ProviderKind::Youtube => Box::new(youtube_provider(session, http)),
    }
}

pub fn authorizer<'a>(
    config: &Config,
    prompt: &'a dyn SecretPrompt,
) -> Result<Box<dyn InteractiveAuthorizer + 'a>> {
    Ok(match config.auth_mode {
        AuthMode::Loopback => Box::new(LoopbackAuthorizer::from_redirect_uri(&config.redirect_uri)?),
        AuthMode::Paste => Box::new(PasteAuthorizer::new(prompt)),
    })
}
