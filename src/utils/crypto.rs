use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use anyhow::{Context, Result};
use rand::RngCore;
use std::fs;
use std::path::Path;

const KEY_FILE: &str = "encryption.key";
const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;

fn load_or_create_key(state_dir: &Path) -> Result<Vec<u8>> {
    let key_path = state_dir.join(KEY_FILE);

    if key_path.exists() {
        let key = fs::read(&key_path).context("Failed to read encryption key")?;
        if key.len() != KEY_SIZE {
            anyhow::bail!("Invalid encryption key size in {:?}", key_path);
        }
        return Ok(key);
    }

    let mut key = vec![0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut key);

    fs::create_dir_all(state_dir)
        .with_context(|| format!("Failed to create state dir {:?}", state_dir))?;
    fs::write(&key_path, &key).context("Failed to write encryption key")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&key_path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(key)
}

fn cipher(state_dir: &Path) -> Result<Aes256Gcm> {
    let key_bytes = load_or_create_key(state_dir)?;
    Aes256Gcm::new_from_slice(&key_bytes).map_err(|e| anyhow::anyhow!("Failed to create cipher: {}", e))
}

/// Encrypt `data` with the state dir's key. Output is `nonce || ciphertext`.
pub fn seal(data: &[u8], state_dir: &Path) -> Result<Vec<u8>> {
    let cipher = cipher(state_dir)?;

    let mut nonce_bytes = vec![0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, data)
        .map_err(|e| anyhow::anyhow!("Encryption failed: {}", e))?;

    let mut sealed = nonce_bytes;
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

pub fn unseal(sealed: &[u8], state_dir: &Path) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_SIZE {
        anyhow::bail!("Invalid encrypted data: too short");
    }

    let cipher = cipher(state_dir)?;
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|e| anyhow::anyhow!("Decryption failed: {}", e))
}
