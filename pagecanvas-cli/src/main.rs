//! # Pagecanvas
//!
//! Command-line host for Pagecanvas pages.

use clap::Parser;
use pagecanvas_cli::{commands, CliArgs, HostConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagecanvas_cli=info,pagecanvas_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let config = HostConfig::from(&args);

    tracing::debug!("Page API: {}", config.api_url);
    tracing::debug!(
        "Canvas: {}x{}, snap {}",
        config.canvas.width,
        config.canvas.height,
        config.snap
    );

    let mut stdout = std::io::stdout().lock();
    commands::run(&config, args.command, &mut stdout).await
}
