//! CLI entry-point for building gene reports.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument, warn};

use super::OutputFormat;
use crate::{
    config::Settings,
    data::Sources,
    genes,
    report::{export, render, BatchReport, ReportAssembler},
};

/// Args for the `report` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Comma separated gene symbols (e.g. "EGFR, TP53"); may be repeated.
    #[arg(long, required = true)]
    pub genes: Vec<String>,
    /// Drug rows shown per gene.
    #[arg(long, default_value_t = 5)]
    pub top_drugs: usize,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Write the rendered report here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Save AlphaFold structure files; without a value they go to `<OUTPUTS_DIR>/structures`.
    #[arg(long, num_args = 0..=1, value_name = "DIR")]
    pub download_dir: Option<Option<PathBuf>>,
    /// Also write the summary table to `<OUTPUTS_DIR>/summary.csv`.
    #[arg(long)]
    pub save_summary: bool,
    /// Override the number of genes processed concurrently.
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Override the per-request timeout.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, mut settings: Settings) -> Result<()> {
    if let Some(concurrency) = args.concurrency {
        settings.concurrency = concurrency.max(1);
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.timeout_secs = timeout_secs;
    }

    let symbols = genes::normalize_all(&args.genes);
    if symbols.is_empty() {
        warn!("no gene symbols supplied; nothing to do");
        return Ok(());
    }

    let sources = Sources::from_settings(&settings)?;
    let assembler = ReportAssembler::new(sources, settings.concurrency);
    let batch = assembler.assemble_batch(&symbols).await;
    info!(
        genes = batch.reports.len(),
        failed = batch.failures(),
        "batch complete"
    );

    if let Some(dir) = &args.download_dir {
        let dir = dir
            .clone()
            .unwrap_or_else(|| settings.join_output("structures"));
        let written = export::write_structures(&batch, &dir)?;
        info!(files = written.len(), dir = %dir.display(), "structure files saved");
    }
    if args.save_summary {
        export::write_summary(&batch, &settings.join_output("summary.csv"))?;
    }

    let rendered = render_batch(&batch, args.format, args.top_drugs)?;
    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, rendered).with_context(|| format!("write {path:?}"))?;
            info!(path = %path.display(), "report written");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn render_batch(batch: &BatchReport, format: OutputFormat, top_drugs: usize) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render::render_text(batch, top_drugs)),
        OutputFormat::Json => render::render_json(batch),
        OutputFormat::Csv => {
            let mut buf = Vec::new();
            render::write_summary_csv(&batch.summary, &mut buf)?;
            Ok(String::from_utf8(buf)?)
        }
        #[cfg(feature = "askama")]
        OutputFormat::Html => render::render_html(batch, top_drugs),
        #[cfg(not(feature = "askama"))]
        OutputFormat::Html => anyhow::bail!("HTML output needs the `askama` feature"),
    }
}
