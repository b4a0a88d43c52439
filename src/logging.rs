use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LEVEL: &str = "warn";

/// Install the global subscriber. An explicit `level` wins over `RUST_LOG`.
///
/// Output goes to stderr so it never interleaves with the prompts and the
/// final report on stdout.
pub fn init_tracing(level: Option<&str>) -> anyhow::Result<()> {
    let filter = filter_for(level, std::env::var("RUST_LOG").ok().as_deref())?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")
}

fn filter_for(level: Option<&str>, rust_log: Option<&str>) -> anyhow::Result<EnvFilter> {
    let directives = level
        .or(rust_log)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_LEVEL);

    EnvFilter::try_new(directives)
        .with_context(|| format!("Invalid log filter '{directives}'"))
}
