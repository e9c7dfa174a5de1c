use clap::Parser;
use tracing_subscriber::EnvFilter;

use heliotv::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("heliotv=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    cli::run(cli).await
}
