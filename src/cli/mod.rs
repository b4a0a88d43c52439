mod args;
pub mod commands;
mod prompt;

pub use args::{Cli, Commands, SyncArgs};
pub use prompt::TerminalPrompt;
