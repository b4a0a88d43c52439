use tracing::{info, warn};

use crate::auth::session::refresh_key;
use crate::auth::{InteractiveAuthorizer, ProviderSession};
use crate::error::AuthError;
use crate::provider::{OAuthProvider, ProviderKind};
use crate::state::CredentialStore;

/// Delete the persisted refresh token of `kind`, leaving client credentials
/// alone. Returns whether there was one.
pub fn forget_refresh_token(store: &dyn CredentialStore, kind: ProviderKind) -> Result<bool, AuthError> {
    let key = refresh_key(kind);
    if store.get(&key).map_err(AuthError::Store)?.is_none() {
        return Ok(false);
    }

    store.delete(&key).map_err(AuthError::Store)?;
    Ok(true)
}

/// Turns persisted refresh tokens into access tokens, running the
/// interactive authorization flow for a provider that has none yet.
///
/// Access tokens are never cached or persisted: every call performs a
/// refresh exchange.
pub struct TokenManager<'a> {
    store: &'a dyn CredentialStore,
    authorizer: &'a dyn InteractiveAuthorizer,
    redirect_uri: String,
    reauthorize_on_refresh_failure: bool,
}

impl<'a> TokenManager<'a> {
    pub fn new(
        store: &'a dyn CredentialStore,
        authorizer: &'a dyn InteractiveAuthorizer,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            store,
            authorizer,
            redirect_uri: redirect_uri.into(),
            reauthorize_on_refresh_failure: false,
        }
    }

    /// Instead of failing on a rejected refresh token, drop it and run the
    /// authorization flow again (once).
    pub fn reauthorize_on_refresh_failure(mut self, enabled: bool) -> Self {
        self.reauthorize_on_refresh_failure = enabled;
        self
    }

    pub async fn access_credential<P>(
        &self,
        provider: &P,
        session: &mut ProviderSession,
    ) -> Result<String, AuthError>
    where
        P: OAuthProvider + ?Sized,
    {
        let refresh_token = match session.refresh_token.clone() {
            Some(token) => token,
            None => self.authorize(provider, session).await?,
        };

        match self.refresh(provider, session, &refresh_token).await {
            Err(AuthError::Refresh { detail, .. }) if self.reauthorize_on_refresh_failure => {
                warn!(
                    provider = %session.kind,
                    "refresh token rejected ({detail}), re-authorizing"
                );
                self.forget(session)?;
                let refresh_token = self.authorize(provider, session).await?;
                self.refresh(provider, session, &refresh_token).await
            }
            result => result,
        }
    }

    /// Run the interactive flow and persist the resulting refresh token.
    pub async fn authorize<P>(
        &self,
        provider: &P,
        session: &mut ProviderSession,
    ) -> Result<String, AuthError>
    where
        P: OAuthProvider + ?Sized,
    {
        let kind = session.kind;
        let state = format!("{:016x}", rand::random::<u64>());
        let url = provider.oauth_url(&self.redirect_uri, &state);

        info!(provider = %kind, "starting authorization");
        let code = self.authorizer.authorize(&url, &state).await?;

        let grant = provider
            .exchange_code(&code, &self.redirect_uri)
            .await
            .map_err(|err| AuthError::Exchange {
                provider: kind,
                detail: format!("{err:#}"),
            })?;

        let refresh_token = grant
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingRefreshToken { provider: kind })?;

        self.store
            .set(&session.refresh_key(), &refresh_token)
            .map_err(AuthError::Store)?;
        session.refresh_token = Some(refresh_token.clone());

        info!(provider = %kind, "authorization complete, refresh token saved");
        Ok(refresh_token)
    }

    /// Drop the persisted refresh token so the next run re-authorizes.
    pub fn forget(&self, session: &mut ProviderSession) -> Result<(), AuthError> {
        forget_refresh_token(self.store, session.kind)?;
        session.refresh_token = None;
        Ok(())
    }

    async fn refresh<P>(
        &self,
        provider: &P,
        session: &mut ProviderSession,
        refresh_token: &str,
    ) -> Result<String, AuthError>
    where
        P: OAuthProvider + ?Sized,
    {
        let grant = provider
            .refresh_access(refresh_token)
            .await
            .map_err(|err| AuthError::Refresh {
                provider: session.kind,
                detail: format!("{err:#}"),
            })?;

        // Some providers rotate the refresh token; keep whichever is newest
        if let Some(rotated) = grant.refresh_token.filter(|t| !t.is_empty() && t != refresh_token) {
            self.store
                .set(&session.refresh_key(), &rotated)
                .map_err(AuthError::Store)?;
            session.refresh_token = Some(rotated);
        }

        Ok(grant.access_token)
    }
}
