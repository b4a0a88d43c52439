use crate::provider::{OAuthProvider, Page, SourceCatalog, SourceItem, TokenGrant};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

const AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";
const PAGE_LIMIT: u32 = 100;

pub struct SpotifyProvider {
    client_id: String,
    client_secret: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct SpotifyTracksPage {
    #[serde(default)]
    items: Vec<SpotifyPlaylistEntry>,
    next: Option<String>,
}

#[derive(Deserialize)]
struct SpotifyPlaylistEntry {
    // null for removed tracks and some local files
    track: Option<SpotifyTrack>,
}

#[derive(Deserialize)]
struct SpotifyTrack {
    name: Option<String>,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    album: Option<SpotifyAlbum>,
}

#[derive(Deserialize)]
struct SpotifyArtist {
    name: Option<String>,
}

#[derive(Deserialize)]
struct SpotifyAlbum {
    name: Option<String>,
}

impl From<SpotifyTracksPage> for Page<SourceItem> {
    fn from(page: SpotifyTracksPage) -> Self {
        let items = page
            .items
            .into_iter()
            .map(|entry| match entry.track {
                Some(track) => SourceItem {
                    title: track.name,
                    artists: track.artists.into_iter().map(|a| a.name).collect(),
                    album: track.album.and_then(|a| a.name),
                },
                None => SourceItem::default(),
            })
            .collect();

        Page {
            items,
            next: page.next,
        }
    }
}

impl SpotifyProvider {
    pub fn new(client_id: String, client_secret: String, http: reqwest::Client) -> Self {
        Self {
            client_id,
            client_secret,
            http,
        }
    }

    fn basic_auth_header(&self) -> String {
        use base64::Engine;
        let credentials = format!("{}:{}", self.client_id, self.client_secret);
        base64::engine::general_purpose::STANDARD.encode(credentials)
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenGrant> {
        let response = self
            .http
            .post(TOKEN_URL)
            .header("Authorization", format!("Basic {}", self.basic_auth_header()))
            .form(params)
            .send()
            .await
            .context("Failed to send token request")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Token request failed: {}", error_text);
        }

        response
            .json()
            .await
            .context("Failed to parse token response")
    }

    fn first_page_url(playlist_id: &str) -> String {
        format!(
            "{}/playlists/{}/tracks?limit={}",
            API_BASE,
            urlencoding::encode(playlist_id),
            PAGE_LIMIT
        )
    }
}

#[async_trait]
impl OAuthProvider for SpotifyProvider {
    fn oauth_url(&self, redirect_uri: &str, state: &str) -> String {
        let scopes = ["playlist-read-private", "playlist-read-collaborative"].join(" ");

        format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
            AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scopes),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        self.token_request(&params).await
    }

    async fn refresh_access(&self, refresh_token: &str) -> Result<TokenGrant> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        self.token_request(&params).await
    }
}

#[async_trait]
impl SourceCatalog for SpotifyProvider {
    async fn playlist_tracks_page(
        &self,
        access_token: &str,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<SourceItem>> {
        // The cursor is the absolute `next` URL handed back by the API
        let url = match cursor {
            Some(next) => next.to_string(),
            None => Self::first_page_url(playlist_id),
        };

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .context("Failed to send Spotify API request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Spotify API error {}: {}", status, error_text);
        }

        let page: SpotifyTracksPage = response
            .json()
            .await
            .context("Failed to parse playlist tracks response")?;

        Ok(page.into())
    }
}
