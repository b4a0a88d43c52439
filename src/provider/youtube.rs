use crate::provider::{
    CandidateItem, DestinationCatalog, OAuthProvider, Page, PlaylistSummary, TokenGrant,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const PAGE_SIZE: u32 = 50;

pub struct YoutubeProvider {
    client_id: String,
    client_secret: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct YoutubePlaylistResponse {
    #[serde(default)]
    items: Vec<YoutubePlaylist>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct YoutubePlaylist {
    id: String,
    snippet: Option<YoutubePlaylistSnippet>,
}

#[derive(Deserialize)]
struct YoutubePlaylistSnippet {
    title: Option<String>,
}

#[derive(Deserialize)]
struct YoutubeCreatedPlaylist {
    id: Option<String>,
}

#[derive(Deserialize)]
struct YoutubePlaylistItemsResponse {
    #[serde(default)]
    items: Vec<YoutubePlaylistItem>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct YoutubePlaylistItem {
    #[serde(rename = "contentDetails")]
    content_details: Option<YoutubeItemContentDetails>,
}

#[derive(Deserialize)]
struct YoutubeItemContentDetails {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct YoutubeSearchResponse {
    #[serde(default)]
    items: Vec<YoutubeSearchItem>,
}

#[derive(Deserialize)]
struct YoutubeSearchItem {
    id: YoutubeSearchId,
    snippet: Option<YoutubeSearchSnippet>,
}

#[derive(Deserialize)]
struct YoutubeSearchId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct YoutubeSearchSnippet {
    title: Option<String>,
    #[serde(rename = "channelTitle")]
    channel_title: Option<String>,
}

impl From<YoutubePlaylistResponse> for Page<PlaylistSummary> {
    fn from(resp: YoutubePlaylistResponse) -> Self {
        let items = resp
            .items
            .into_iter()
            .map(|p| PlaylistSummary {
                id: p.id,
                title: p.snippet.and_then(|s| s.title).unwrap_or_default(),
            })
            .collect();

        Page {
            items,
            next: resp.next_page_token,
        }
    }
}

impl From<YoutubePlaylistItemsResponse> for Page<String> {
    fn from(resp: YoutubePlaylistItemsResponse) -> Self {
        let items = resp
            .items
            .into_iter()
            .filter_map(|item| item.content_details.and_then(|d| d.video_id))
            .collect();

        Page {
            items,
            next: resp.next_page_token,
        }
    }
}

impl YoutubeSearchResponse {
    // `type=video` should guarantee a videoId, but channel hits slip through occasionally
    fn into_candidates(self) -> Vec<CandidateItem> {
        self.items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.video_id?;
                let (title, channel_title) = match item.snippet {
                    Some(s) => (s.title.unwrap_or_default(), s.channel_title.unwrap_or_default()),
                    None => (String::new(), String::new()),
                };
                Some(CandidateItem {
                    id,
                    title,
                    channel_title,
                })
            })
            .collect()
    }
}

impl YoutubeProvider {
    pub fn new(client_id: String, client_secret: String, http: reqwest::Client) -> Self {
        Self {
            client_id,
            client_secret,
            http,
        }
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenGrant> {
        let response = self
            .http
            .post(TOKEN_URL)
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

    async fn api_get<T: serde::de::DeserializeOwned>(&self, url: &str, token: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .context("Failed to send API request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("YouTube API error {}: {}", status, error_text);
        }

        response
            .json()
            .await
            .context("Failed to parse API response")
    }

    async fn api_post<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Bearer {}", token))
            .json(body)
            .send()
            .await
            .context("Failed to send API request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("YouTube API error {}: {}", status, error_text);
        }

        response
            .json()
            .await
            .context("Failed to parse API response")
    }

    fn with_page_token(mut url: String, page_token: Option<&str>) -> String {
        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }
        url
    }
}

#[async_trait]
impl OAuthProvider for YoutubeProvider {
    fn oauth_url(&self, redirect_uri: &str, state: &str) -> String {
        let scopes = [
            "https://www.googleapis.com/auth/youtube",
            "https://www.googleapis.com/auth/youtube.force-ssl",
        ]
        .join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&access_type=offline&prompt=consent",
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
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        self.token_request(&params).await
    }

    async fn refresh_access(&self, refresh_token: &str) -> Result<TokenGrant> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        self.token_request(&params).await
    }
}

#[async_trait]
impl DestinationCatalog for YoutubeProvider {
    async fn my_playlists_page(
        &self,
        access_token: &str,
        page_token: Option<&str>,
    ) -> Result<Page<PlaylistSummary>> {
        let url = Self::with_page_token(
            format!(
                "{}/playlists?part=snippet&mine=true&maxResults={}",
                API_BASE, PAGE_SIZE
            ),
            page_token,
        );

        let resp: YoutubePlaylistResponse = self.api_get(&url, access_token).await?;
        Ok(resp.into())
    }

    async fn create_playlist(
        &self,
        access_token: &str,
        title: &str,
    ) -> Result<Option<String>> {
        let body = serde_json::json!({
            "snippet": { "title": title },
            "status": { "privacyStatus": "private" }
        });

        let created: YoutubeCreatedPlaylist = self
            .api_post(
                &format!("{}/playlists?part=snippet,status", API_BASE),
                access_token,
                &body,
            )
            .await?;

        Ok(created.id.filter(|id| !id.is_empty()))
    }

    async fn playlist_items_page(
        &self,
        access_token: &str,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page<String>> {
        let url = Self::with_page_token(
            format!(
                "{}/playlistItems?part=contentDetails&playlistId={}&maxResults={}",
                API_BASE,
                urlencoding::encode(playlist_id),
                PAGE_SIZE
            ),
            page_token,
        );

        let resp: YoutubePlaylistItemsResponse = self.api_get(&url, access_token).await?;
        Ok(resp.into())
    }

    async fn search(
        &self,
        access_token: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<CandidateItem>> {
        let url = format!(
            "{}/search?part=snippet&type=video&maxResults={}&q={}",
            API_BASE,
            max_results,
            urlencoding::encode(query)
        );

        let resp: YoutubeSearchResponse = self.api_get(&url, access_token).await?;
        Ok(resp.into_candidates())
    }

    async fn insert_item(&self, access_token: &str, playlist_id: &str, item_id: &str) -> Result<()> {
        let body = serde_json::json!({
            "snippet": {
                "playlistId": playlist_id,
                "resourceId": {
                    "kind": "youtube#video",
                    "videoId": item_id
                }
            }
        });

        let _: serde_json::Value = self
            .api_post(
                &format!("{}/playlistItems?part=snippet", API_BASE),
                access_token,
                &body,
            )
            .await?;

        Ok(())
    }
}
