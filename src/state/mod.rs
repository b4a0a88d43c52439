mod config;
pub mod credentials;
pub mod journal;

pub use config::{AuthMode, ClientConfig, Config};
pub use credentials::{CredentialStore, FileCredentialStore, SecretPrompt};
pub use journal::RunRecord;
