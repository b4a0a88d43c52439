mod auth;
mod cli;
mod error;
mod logging;
mod provider;
mod state;
mod sync;
mod utils;

#[cfg(test)]
mod test_support;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignores if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init_tracing(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Init { playlist, title } => {
            cli::commands::init::run(&playlist, title, &cli.state_dir)?;
        }
        Commands::Sync(args) => {
            cli::commands::sync::run(args, &cli.state_dir).await?;
        }
        Commands::Auth { provider } => {
            cli::commands::auth::run(provider, &cli.state_dir).await?;
        }
        Commands::Logout { provider } => {
            cli::commands::auth::logout(provider, &cli.state_dir)?;
        }
        Commands::History { limit } => {
            cli::commands::history::run(limit, &cli.state_dir)?;
        }
    }

    Ok(())
}
