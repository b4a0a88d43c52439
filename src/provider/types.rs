use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Spotify,
    Youtube,
}

impl ProviderKind {
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::Spotify => "Spotify",
            ProviderKind::Youtube => "Google (YouTube)",
        }
    }

    /// Store key for a named secret of this provider, e.g. `spotify.refresh_token`.
    pub fn key(&self, name: &str) -> String {
        format!("{}.{}", self, name)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Spotify => f.write_str("spotify"),
            ProviderKind::Youtube => f.write_str("youtube"),
        }
    }
}

/// Result of a code or refresh exchange against a token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// A source entry as delivered by the catalog, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceItem {
    pub title: Option<String>,
    pub artists: Vec<Option<String>>,
    pub album: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    pub title: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    pub id: String,
    pub title: String,
    pub channel_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub id: String,
    pub title: String,
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPlaylistState {
    pub id: String,
    pub existing_item_ids: HashSet<String>,
}
