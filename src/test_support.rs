//! In-memory doubles for the provider, store, prompt and authorizer seams.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::auth::InteractiveAuthorizer;
use crate::error::AuthError;
use crate::provider::{
    CandidateItem, DestinationCatalog, OAuthProvider, Page, PlaylistSummary,
    ProviderKind, SourceCatalog, SourceItem, TokenGrant,
};
use crate::state::{CredentialStore, SecretPrompt};

#[derive(Default)]
pub struct MemoryCredentialStore {
    secrets: Mutex<HashMap<String, String>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.secrets.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.secrets
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.secrets.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Answers prompts from a script; `None` entries simulate a cancel.
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<Option<String>>>,
    asked: Mutex<Vec<(String, bool)>>,
}

impl ScriptedPrompt {
    pub fn new(answers: Vec<Option<String>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<(String, bool)> {
        self.asked.lock().unwrap().clone()
    }
}

impl SecretPrompt for ScriptedPrompt {
    fn prompt(&self, key: &str, _message: &str, sensitive: bool) -> Result<Option<String>> {
        self.asked.lock().unwrap().push((key.to_string(), sensitive));
        match self.answers.lock().unwrap().pop_front() {
            Some(answer) => Ok(answer),
            None => anyhow::bail!("unexpected prompt for {key}"),
        }
    }
}

pub struct FixedAuthorizer {
    code: Option<String>,
    last_request: Mutex<Option<(String, String)>>,
}

impl FixedAuthorizer {
    pub fn code(code: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            last_request: Mutex::new(None),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            code: None,
            last_request: Mutex::new(None),
        }
    }

    /// `(url, state)` of the most recent authorization
    pub fn last_request(&self) -> Option<(String, String)> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl InteractiveAuthorizer for FixedAuthorizer {
    async fn authorize(&self, url: &str, state: &str) -> Result<String, AuthError> {
        *self.last_request.lock().unwrap() = Some((url.to_string(), state.to_string()));
        self.code.clone().ok_or(AuthError::Cancelled)
    }
}

/// Never returns, like an operator who walked away from the browser.
pub struct HangingAuthorizer;

#[async_trait]
impl InteractiveAuthorizer for HangingAuthorizer {
    async fn authorize(&self, _url: &str, _state: &str) -> Result<String, AuthError> {
        std::future::pending().await
    }
}

/// Token endpoint double. Hands out `refresh_token` on code exchange and
/// accepts only that token (or its rotation) for refreshes.
pub struct FakeOAuth {
    kind: ProviderKind,
    refresh_token: String,
    refresh_in_exchange: bool,
    rotate_to: Option<String>,
    exchanged: Mutex<Vec<String>>,
    refreshes: Mutex<usize>,
}

impl FakeOAuth {
    pub fn new(kind: ProviderKind, refresh_token: &str) -> Self {
        Self {
            kind,
            refresh_token: refresh_token.to_string(),
            refresh_in_exchange: true,
            rotate_to: None,
            exchanged: Mutex::new(Vec::new()),
            refreshes: Mutex::new(0),
        }
    }

    pub fn without_refresh_in_exchange(mut self) -> Self {
        self.refresh_in_exchange = false;
        self
    }

    pub fn rotating_to(mut self, rotated: &str) -> Self {
        self.rotate_to = Some(rotated.to_string());
        self
    }

    pub fn exchanged_codes(&self) -> Vec<String> {
        self.exchanged.lock().unwrap().clone()
    }

    pub fn refresh_calls(&self) -> usize {
        *self.refreshes.lock().unwrap()
    }
}

#[async_trait]
impl OAuthProvider for FakeOAuth {
    fn oauth_url(&self, redirect_uri: &str, state: &str) -> String {
        format!("https://auth.invalid/{}?redirect_uri={redirect_uri}&state={state}", self.kind)
    }

    async fn exchange_code(&self, code: &str, _redirect_uri: &str) -> Result<TokenGrant> {
        self.exchanged.lock().unwrap().push(code.to_string());
        Ok(TokenGrant {
            access_token: "access-from-code".to_string(),
            refresh_token: self.refresh_in_exchange.then(|| self.refresh_token.clone()),
        })
    }

    async fn refresh_access(&self, refresh_token: &str) -> Result<TokenGrant> {
        *self.refreshes.lock().unwrap() += 1;
        if refresh_token != self.refresh_token {
            anyhow::bail!("invalid_grant");
        }
        Ok(TokenGrant {
            access_token: format!("access-for-{refresh_token}"),
            refresh_token: self.rotate_to.clone(),
        })
    }
}

/// Source catalog serving fixed pages, chained by `page-N` cursors.
pub struct FakeSource {
    oauth: FakeOAuth,
    pages: Vec<Vec<SourceItem>>,
    fetched: Mutex<Vec<Option<String>>>,
}

impl FakeSource {
    pub fn new(pages: Vec<Vec<SourceItem>>) -> Self {
        Self {
            oauth: FakeOAuth::new(ProviderKind::Spotify, "sp-refresh"),
            pages,
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// `(title, artists)` pairs on a single page
    pub fn tracks(tracks: &[(&str, &[&str])]) -> Self {
        Self::new(vec![tracks.iter().map(|(t, a)| item(t, a)).collect()])
    }

    /// Cursors requested so far, `None` being the first page
    pub fn fetched(&self) -> Vec<Option<String>> {
        self.fetched.lock().unwrap().clone()
    }
}

pub fn item(title: &str, artists: &[&str]) -> SourceItem {
    SourceItem {
        title: Some(title.to_string()),
        artists: artists.iter().map(|a| Some(a.to_string())).collect(),
        album: None,
    }
}

#[async_trait]
impl OAuthProvider for FakeSource {
    fn oauth_url(&self, redirect_uri: &str, state: &str) -> String {
        self.oauth.oauth_url(redirect_uri, state)
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant> {
        self.oauth.exchange_code(code, redirect_uri).await
    }

    async fn refresh_access(&self, refresh_token: &str) -> Result<TokenGrant> {
        self.oauth.refresh_access(refresh_token).await
    }
}

#[async_trait]
impl SourceCatalog for FakeSource {
    async fn playlist_tracks_page(
        &self,
        _access_token: &str,
        _playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<SourceItem>> {
        self.fetched.lock().unwrap().push(cursor.map(str::to_string));

        let index = match cursor {
            None => 0,
            Some(c) => c
                .strip_prefix("page-")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| anyhow::anyhow!("bad cursor {c}"))?,
        };

        let items = self.pages.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));
        Ok(Page { items, next })
    }
}

/// Destination catalog with in-memory playlists and scripted search results.
pub struct FakeDestination {
    oauth: FakeOAuth,
    page_size: usize,
    playlists: Mutex<Vec<PlaylistSummary>>,
    members: Mutex<HashMap<String, Vec<String>>>,
    search_results: HashMap<String, Vec<CandidateItem>>,
    failing_searches: HashSet<String>,
    failing_inserts: HashSet<String>,
    create_returns_id: bool,
    searches: Mutex<Vec<(String, u32)>>,
    mutations: Mutex<usize>,
}

impl FakeDestination {
    pub fn new() -> Self {
        Self {
            oauth: FakeOAuth::new(ProviderKind::Youtube, "yt-refresh"),
            page_size: 50,
            playlists: Mutex::new(Vec::new()),
            members: Mutex::new(HashMap::new()),
            search_results: HashMap::new(),
            failing_searches: HashSet::new(),
            failing_inserts: HashSet::new(),
            create_returns_id: true,
            searches: Mutex::new(Vec::new()),
            mutations: Mutex::new(0),
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_playlist(self, id: &str, title: &str, members: &[&str]) -> Self {
        self.playlists.lock().unwrap().push(PlaylistSummary {
            id: id.to_string(),
            title: title.to_string(),
        });
        self.members.lock().unwrap().insert(
            id.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    /// Search hits as `(id, title, channel)`
    pub fn with_search(mut self, query: &str, hits: &[(&str, &str, &str)]) -> Self {
        let candidates = hits
            .iter()
            .map(|(id, title, channel)| CandidateItem {
                id: id.to_string(),
                title: title.to_string(),
                channel_title: channel.to_string(),
            })
            .collect();
        self.search_results.insert(query.to_string(), candidates);
        self
    }

    pub fn failing_search(mut self, query: &str) -> Self {
        self.failing_searches.insert(query.to_string());
        self
    }

    pub fn failing_insert(mut self, item_id: &str) -> Self {
        self.failing_inserts.insert(item_id.to_string());
        self
    }

    pub fn create_without_id(mut self) -> Self {
        self.create_returns_id = false;
        self
    }

    pub fn members(&self, playlist_id: &str) -> Vec<String> {
        self.members
            .lock()
            .unwrap()
            .get(playlist_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn playlists(&self) -> Vec<PlaylistSummary> {
        self.playlists.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<(String, u32)> {
        self.searches.lock().unwrap().clone()
    }

    /// Number of create/insert calls that reached the fake
    pub fn mutations(&self) -> usize {
        *self.mutations.lock().unwrap()
    }

    fn paginate<T: Clone>(&self, all: &[T], page_token: Option<&str>) -> Result<Page<T>> {
        let start: usize = match page_token {
            None => 0,
            Some(t) => t.parse().map_err(|_| anyhow::anyhow!("bad page token {t}"))?,
        };
        let end = (start + self.page_size).min(all.len());
        let items = all.get(start..end).map(<[T]>::to_vec).unwrap_or_default();
        let next = (end < all.len()).then(|| end.to_string());
        Ok(Page { items, next })
    }
}

#[async_trait]
impl OAuthProvider for FakeDestination {
    fn oauth_url(&self, redirect_uri: &str, state: &str) -> String {
        self.oauth.oauth_url(redirect_uri, state)
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant> {
        self.oauth.exchange_code(code, redirect_uri).await
    }

    async fn refresh_access(&self, refresh_token: &str) -> Result<TokenGrant> {
        self.oauth.refresh_access(refresh_token).await
    }
}

#[async_trait]
impl DestinationCatalog for FakeDestination {
    async fn my_playlists_page(
        &self,
        _access_token: &str,
        page_token: Option<&str>,
    ) -> Result<Page<PlaylistSummary>> {
        let all = self.playlists();
        self.paginate(&all, page_token)
    }

    async fn create_playlist(
        &self,
        _access_token: &str,
        title: &str,
    ) -> Result<Option<String>> {
        *self.mutations.lock().unwrap() += 1;
        if !self.create_returns_id {
            return Ok(None);
        }

        let mut playlists = self.playlists.lock().unwrap();
        let id = format!("PL{}", playlists.len() + 1);
        playlists.push(PlaylistSummary {
            id: id.clone(),
            title: title.to_string(),
        });
        self.members.lock().unwrap().insert(id.clone(), Vec::new());
        Ok(Some(id))
    }

    async fn playlist_items_page(
        &self,
        _access_token: &str,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page<String>> {
        let all = self.members(playlist_id);
        self.paginate(&all, page_token)
    }

    async fn search(
        &self,
        _access_token: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<CandidateItem>> {
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));

        if self.failing_searches.contains(query) {
            anyhow::bail!("quotaExceeded");
        }

        let mut hits = self.search_results.get(query).cloned().unwrap_or_default();
        hits.truncate(max_results as usize);
        Ok(hits)
    }

    async fn insert_item(&self, _access_token: &str, playlist_id: &str, item_id: &str) -> Result<()> {
        *self.mutations.lock().unwrap() += 1;
        if self.failing_inserts.contains(item_id) {
            anyhow::bail!("videoNotFound");
        }

        self.members
            .lock()
            .unwrap()
            .entry(playlist_id.to_string())
            .or_default()
            .push(item_id.to_string());
        Ok(())
    }
}
