mod authorizer;
mod session;
mod token_manager;

pub use authorizer::{InteractiveAuthorizer, LoopbackAuthorizer, PasteAuthorizer};
pub use session::ProviderSession;
pub use token_manager::{forget_refresh_token, TokenManager};
