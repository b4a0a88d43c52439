use crate::provider::{CandidateItem, Page, PlaylistSummary, SourceItem, TokenGrant};
use async_trait::async_trait;

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Generate OAuth authorization URL
    fn oauth_url(&self, redirect_uri: &str, state: &str) -> String;

    /// Exchange authorization code for tokens
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> anyhow::Result<TokenGrant>;

    /// Exchange a refresh token for a fresh access token
    async fn refresh_access(&self, refresh_token: &str) -> anyhow::Result<TokenGrant>;
}

/// Read side of the music catalog the tracks come from.
#[async_trait]
pub trait SourceCatalog: OAuthProvider {
    /// Fetch one page of playlist entries. `cursor` is `None` for the first
    /// page and otherwise the opaque value from the previous page's `next`.
    async fn playlist_tracks_page(
        &self,
        access_token: &str,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> anyhow::Result<Page<SourceItem>>;
}

/// The video catalog that receives the matches.
#[async_trait]
pub trait DestinationCatalog: OAuthProvider {
    /// Playlists owned by the authenticated account
    async fn my_playlists_page(
        &self,
        access_token: &str,
        page_token: Option<&str>,
    ) -> anyhow::Result<Page<PlaylistSummary>>;

    /// Create a private playlist, returning its id if the API reported one
    async fn create_playlist(
        &self,
        access_token: &str,
        title: &str,
    ) -> anyhow::Result<Option<String>>;

    /// Item (video) ids of one page of a playlist's membership
    async fn playlist_items_page(
        &self,
        access_token: &str,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> anyhow::Result<Page<String>>;

    async fn search(
        &self,
        access_token: &str,
        query: &str,
        max_results: u32,
    ) -> anyhow::Result<Vec<CandidateItem>>;

    async fn insert_item(
        &self,
        access_token: &str,
        playlist_id: &str,
        item_id: &str,
    ) -> anyhow::Result<()>;
}
