//! Runtime configuration utilities for target-scope.

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context};
use serde::Deserialize;

pub const DEFAULT_PHAROS_URL: &str = "https://pharos-api.ncats.io/graphql";
pub const DEFAULT_OPENTARGETS_URL: &str = "https://api.platform.opentargets.org/api/v4/graphql";
pub const DEFAULT_ALPHAFOLD_URL: &str = "https://alphafold.ebi.ac.uk";

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Pharos GraphQL endpoint.
    pub pharos_url: String,
    /// Open Targets GraphQL endpoint.
    pub opentargets_url: String,
    /// AlphaFold DB base URL (the prediction API lives below it).
    pub alphafold_url: String,
    /// Timeout applied to every outbound request, in seconds.
    pub timeout_secs: u64,
    /// Number of recent publications requested per target.
    pub max_publications: usize,
    /// Genes processed concurrently within one batch.
    pub concurrency: usize,
    /// Root folder for exported reports and structure files.
    pub outputs_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pharos_url: DEFAULT_PHAROS_URL.to_string(),
            opentargets_url: DEFAULT_OPENTARGETS_URL.to_string(),
            alphafold_url: DEFAULT_ALPHAFOLD_URL.to_string(),
            timeout_secs: 15,
            max_publications: 10,
            concurrency: 4,
            outputs_dir: PathBuf::from("./outputs"),
        }
    }
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        let pharos_url = env::var("PHAROS_URL").unwrap_or(defaults.pharos_url);
        let opentargets_url = env::var("OPENTARGETS_URL").unwrap_or(defaults.opentargets_url);
        let alphafold_url = env::var("ALPHAFOLD_URL").unwrap_or(defaults.alphafold_url);
        let timeout_secs = parse_var("HTTP_TIMEOUT_SECS")?.unwrap_or(defaults.timeout_secs);
        let max_publications =
            parse_var("MAX_PUBLICATIONS")?.unwrap_or(defaults.max_publications);
        let concurrency = parse_var::<usize>("GENE_CONCURRENCY")?
            .unwrap_or(defaults.concurrency)
            .max(1);
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.outputs_dir);

        let settings = Self {
            pharos_url,
            opentargets_url,
            alphafold_url,
            timeout_secs,
            max_publications,
            concurrency,
            outputs_dir,
        };
        settings.validate().context("invalid HTTP_TIMEOUT_SECS")?;
        Ok(settings)
    }

    /// Every request must be bounded, so a zero timeout is rejected.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.timeout_secs >= 1, "timeout must be at least one second");
        Ok(())
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}

fn parse_var<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("parsing {key}={raw}")),
        Err(_) => Ok(None),
    }
}
