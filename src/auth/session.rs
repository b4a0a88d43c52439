use crate::error::AuthError;
use crate::provider::ProviderKind;
use crate::state::{ClientConfig, CredentialStore, SecretPrompt};

/// Everything needed to authenticate against one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSession {
    pub kind: ProviderKind,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: Option<String>,
}

impl ProviderSession {
    /// Resolve client credentials from config, then the store, then the
    /// operator. Prompted values are persisted so the prompt happens once.
    pub fn load(
        kind: ProviderKind,
        configured: &ClientConfig,
        store: &dyn CredentialStore,
        prompt: &dyn SecretPrompt,
    ) -> Result<Self, AuthError> {
        let client_id = need(
            store,
            prompt,
            kind,
            "client_id",
            configured.client_id.as_deref(),
            &format!("Enter {} CLIENT_ID", kind.label()),
            false,
        )?;
        let client_secret = need(
            store,
            prompt,
            kind,
            "client_secret",
            configured.client_secret.as_deref(),
            &format!("Enter {} CLIENT_SECRET", kind.label()),
            true,
        )?;

        let refresh_token = store
            .get(&refresh_key(kind))
            .map_err(AuthError::Store)?
            .filter(|t| !t.is_empty());

        Ok(Self {
            kind,
            client_id,
            client_secret,
            refresh_token,
        })
    }

    pub fn refresh_key(&self) -> String {
        refresh_key(self.kind)
    }
}

/// Store key holding the refresh token of `kind`.
pub fn refresh_key(kind: ProviderKind) -> String {
    kind.key("refresh_token")
}

fn need(
    store: &dyn CredentialStore,
    prompt: &dyn SecretPrompt,
    kind: ProviderKind,
    name: &'static str,
    configured: Option<&str>,
    message: &str,
    sensitive: bool,
) -> Result<String, AuthError> {
    if let Some(value) = configured.map(str::trim).filter(|v| !v.is_empty()) {
        return Ok(value.to_string());
    }

    let key = kind.key(name);
    if let Some(value) = store.get(&key).map_err(AuthError::Store)? {
        if !value.is_empty() {
            return Ok(value);
        }
    }

    let value = prompt
        .prompt(&key, message, sensitive)
        .map_err(AuthError::Flow)?
        .ok_or(AuthError::Cancelled)?;
    let value = value.trim().to_string();

    if value.is_empty() {
        return Err(AuthError::MissingClientCredential {
            provider: kind,
            what: name,
        });
    }

    store.set(&key, &value).map_err(AuthError::Store)?;
    Ok(value)
}
