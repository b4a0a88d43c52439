use std::time::Duration;

use thiserror::Error;

use crate::provider::ProviderKind;

/// Anything that stops us from holding a usable access token. Always fatal.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("setup cancelled")]
    Cancelled,

    #[error("missing {what} for {provider}")]
    MissingClientCredential {
        provider: ProviderKind,
        what: &'static str,
    },

    #[error("no authorization code found in redirected URL")]
    MissingCode,

    #[error("authorization state mismatch, possible CSRF")]
    StateMismatch,

    #[error("authorization denied: {0}")]
    Denied(String),

    #[error("failed to obtain {provider} refresh token")]
    MissingRefreshToken { provider: ProviderKind },

    #[error("{provider} code exchange failed: {detail}")]
    Exchange {
        provider: ProviderKind,
        detail: String,
    },

    #[error("{provider} token refresh failed (run `tubesync logout {provider}` to re-authorize): {detail}")]
    Refresh {
        provider: ProviderKind,
        detail: String,
    },

    #[error("credential store: {0:#}")]
    Store(anyhow::Error),

    #[error("authorization flow failed: {0:#}")]
    Flow(anyhow::Error),
}

/// Errors that abort a sync run. Per-track misses and insert failures are
/// counted in the report instead.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("failed to create playlist '{title}': no id returned")]
    Create { title: String },

    #[error("sync did not finish within {0:?}")]
    Deadline(Duration),

    #[error(transparent)]
    Api(#[from] anyhow::Error),
}
