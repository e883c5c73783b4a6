//! Command-line interface wiring for target-scope.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Settings;

pub mod report;
pub mod serve;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Gene target, drug and structure reports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Report(args) => report::run(args, settings).await,
            Commands::Serve(args) => serve::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Look up genes and print or export their reports.
    Report(report::Args),
    /// Serve the JSON API with an in-memory copy of the last batch.
    Serve(serve::Args),
}

/// Output format for the `report` command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable sections and summary table.
    #[default]
    Text,
    /// Full batch as pretty-printed JSON.
    Json,
    /// Summary table only.
    Csv,
    /// Standalone HTML page.
    Html,
}
