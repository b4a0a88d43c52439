pub mod auth;
pub mod history;
pub mod init;
pub mod sync;
mod utils;
