use std::path::Path;

use anyhow::Result;
use cliclack::{intro, outro};

use super::utils::{authorizer, load_config, oauth_provider, open_session};
use crate::auth::{forget_refresh_token, TokenManager};
use crate::cli::TerminalPrompt;
use crate::provider::{self, ProviderKind};
use crate::state::FileCredentialStore;

/// Run the authorization flow even if a refresh token is already saved.
pub async fn run(kind: ProviderKind, state_dir: &Path) -> Result<()> {
    intro(format!("Authorize {}", kind.label()))?;

    let config = load_config(state_dir)?;
    let store = FileCredentialStore::new(state_dir);
    let prompt = TerminalPrompt;

    let mut session = open_session(kind, &config, &store, &prompt)?;
    let http = provider::http_client(config.request_timeout())?;
    let provider = oauth_provider(&session, &http);

    let authorizer = authorizer(&config, &prompt)?;
    let tokens = TokenManager::new(&store, authorizer.as_ref(), config.redirect_uri.clone());

    tokens.authorize(provider.as_ref(), &mut session).await?;
    // prove the new token works before declaring victory
    tokens.access_credential(provider.as_ref(), &mut session).await?;

    outro(format!("Authenticated with {}", kind.label()))?;
    Ok(())
}

pub fn logout(kind: ProviderKind, state_dir: &Path) -> Result<()> {
    let store = FileCredentialStore::new(state_dir);

    if forget_refresh_token(&store, kind)? {
        outro(format!(
            "Logged out from {}. The next sync will ask you to authorize again.",
            kind.label()
        ))?;
    } else {
        outro(format!("Not logged in to {}", kind.label()))?;
    }

    Ok(())
}
