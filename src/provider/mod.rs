pub mod spotify;
mod traits;
mod types;
pub mod youtube;

pub use spotify::SpotifyProvider;
pub use traits::{DestinationCatalog, OAuthProvider, SourceCatalog};
pub use types::*;
pub use youtube::YoutubeProvider;

use std::time::Duration;

/// HTTP client shared by both providers, with a per-request timeout.
pub fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    use anyhow::Context;

    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("tubesync/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}
