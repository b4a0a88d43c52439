use crate::utils::crypto;
use anyhow::{Context, Result};
use base64::Engine;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CREDENTIALS_FILE: &str = "credentials.enc";

/// Named secrets (client ids/secrets, refresh tokens) that outlive a run.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Succeeds when the key is already absent.
    fn delete(&self, key: &str) -> Result<()>;
}

/// Interactive fallback for secrets the store does not have yet.
pub trait SecretPrompt: Send + Sync {
    /// Ask the operator for `key`. `Ok(None)` means the operator cancelled.
    fn prompt(&self, key: &str, message: &str, sensitive: bool) -> Result<Option<String>>;
}

/// All secrets in one AES-GCM sealed JSON map under the state dir.
pub struct FileCredentialStore {
    state_dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            state_dir: state_dir.to_path_buf(),
        }
    }

    fn path(&self) -> PathBuf {
        self.state_dir.join(CREDENTIALS_FILE)
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let path = self.path();

        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let encoded = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read credentials from {:?}", path))?;

        let sealed = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .context("Failed to decode credentials")?;

        let json = crypto::unseal(&sealed, &self.state_dir).context("Failed to decrypt credentials")?;

        serde_json::from_slice(&json).context("Failed to parse credentials")
    }

    fn save(&self, secrets: &BTreeMap<String, String>) -> Result<()> {
        let path = self.path();

        fs::create_dir_all(&self.state_dir)
            .with_context(|| format!("Failed to create credentials dir {:?}", self.state_dir))?;

        let json = serde_json::to_vec(secrets).context("Failed to serialize credentials")?;
        let sealed = crypto::seal(&json, &self.state_dir).context("Failed to encrypt credentials")?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&sealed);

        fs::write(&path, encoded)
            .with_context(|| format!("Failed to write credentials to {:?}", path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut secrets = self.load()?;
        secrets.insert(key.to_string(), value.to_string());
        self.save(&secrets)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut secrets = self.load()?;
        if secrets.remove(key).is_some() {
            self.save(&secrets)?;
        }
        Ok(())
    }
}
