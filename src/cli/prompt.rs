use std::io;

use anyhow::Context;

use crate::state::SecretPrompt;

/// Prompts on the terminal. Ctrl-C / Esc count as a cancel.
pub struct TerminalPrompt;

impl SecretPrompt for TerminalPrompt {
    fn prompt(&self, key: &str, message: &str, sensitive: bool) -> anyhow::Result<Option<String>> {
        let answer = if sensitive {
            cliclack::password(message).mask('▪').interact()
        } else {
            cliclack::input(message).interact::<String>()
        };

        match answer {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(err) => Err(err).with_context(|| format!("Failed to read {key}")),
        }
    }
}
