//! CLI entry-point for the report service.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{api, config::Settings};

/// Bind address and per-batch overrides for the service.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    /// Genes looked up concurrently for each submitted batch.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, mut settings: Settings) -> Result<()> {
    if let Some(concurrency) = args.concurrency {
        settings.concurrency = concurrency.max(1);
    }
    api::serve(&settings, &args.host, args.port).await
}
