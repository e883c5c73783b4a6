//! Per-gene report assembly across the three upstream sources.

pub mod cache;
pub mod export;
pub mod render;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use indexmap::IndexSet;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    data::{
        alphafold::StructurePrediction,
        opentargets::DrugAssociation,
        pharos::{DevelopmentLevel, TargetRecord},
        Sources,
    },
    error::LookupError,
    genes::GeneSymbol,
};

/// Outcome for one gene: either a merged record or the reason the lookup failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GeneReport {
    Composite {
        symbol: GeneSymbol,
        target: TargetRecord,
        drugs: Option<DrugAssociation>,
        structure: Option<StructurePrediction>,
    },
    Failed {
        symbol: GeneSymbol,
        error: LookupError,
    },
}

impl GeneReport {
    pub fn symbol(&self) -> &GeneSymbol {
        match self {
            Self::Composite { symbol, .. } | Self::Failed { symbol, .. } => symbol,
        }
    }

    pub fn target(&self) -> Option<&TargetRecord> {
        match self {
            Self::Composite { target, .. } => Some(target),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&LookupError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            Self::Composite { .. } => None,
        }
    }

    pub fn drugs(&self) -> Option<&DrugAssociation> {
        match self {
            Self::Composite { drugs, .. } => drugs.as_ref(),
            Self::Failed { .. } => None,
        }
    }

    pub fn structure(&self) -> Option<&StructurePrediction> {
        match self {
            Self::Composite { structure, .. } => structure.as_ref(),
            Self::Failed { .. } => None,
        }
    }

    /// Structure bytes with a download name unique to this gene.
    pub fn structure_file(&self) -> Option<(String, &[u8])> {
        let bytes = self.structure()?.file_bytes.as_deref()?;
        let symbol = file_safe(self.symbol().as_str());
        let name = match self.target().and_then(|t| t.primary_accession_id.as_deref()) {
            Some(accession) => format!("AF_{symbol}_{}.pdb", file_safe(accession)),
            None => format!("AF_{symbol}.pdb"),
        };
        Some((name, bytes))
    }
}

/// Keep `[A-Za-z0-9_.-]`; anything else becomes `_` so the name is one path
/// segment and fits inside a quoted header value.
fn file_safe(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// One line of the batch overview; only successful genes appear.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub symbol: GeneSymbol,
    pub development_level: DevelopmentLevel,
    pub family: String,
    pub accession_id: Option<String>,
    pub structure_url: Option<String>,
}

/// Reports for one submission, in input order, plus the overview table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub reports: Vec<GeneReport>,
    pub summary: Vec<SummaryRow>,
}

impl BatchReport {
    pub fn from_reports(reports: Vec<GeneReport>) -> Self {
        let summary = summary(&reports);
        Self {
            generated_at: Utc::now(),
            reports,
            summary,
        }
    }

    pub fn failures(&self) -> usize {
        self.reports.iter().filter(|r| r.error().is_some()).count()
    }
}

/// Build the overview table from composite reports.
pub fn summary(reports: &[GeneReport]) -> Vec<SummaryRow> {
    reports
        .iter()
        .filter_map(|report| {
            let target = report.target()?;
            Some(SummaryRow {
                symbol: report.symbol().clone(),
                development_level: target.development_level.clone(),
                family: target.family.clone(),
                accession_id: target.primary_accession_id.clone(),
                structure_url: report.structure().and_then(|s| s.source_url.clone()),
            })
        })
        .collect()
}

/// Runs the lookup pipeline for a batch of genes.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    sources: Sources,
    concurrency: usize,
}

impl ReportAssembler {
    pub fn new(sources: Sources, concurrency: usize) -> Self {
        Self {
            sources,
            concurrency: concurrency.max(1),
        }
    }

    /// One report per unique symbol, in input order.
    ///
    /// Up to `concurrency` genes are in flight at once; `buffered` yields them in
    /// submission order regardless of completion order.
    #[instrument(skip_all, fields(genes = symbols.len(), concurrency = self.concurrency))]
    pub async fn assemble(&self, symbols: &[GeneSymbol]) -> Vec<GeneReport> {
        let unique: IndexSet<GeneSymbol> = symbols.iter().cloned().collect();
        info!(unique = unique.len(), "assembling gene reports");

        let reports: Vec<GeneReport> = stream::iter(unique)
            .map(|symbol| self.assemble_one(symbol))
            .buffered(self.concurrency)
            .collect()
            .await;

        let failed = reports.iter().filter(|r| r.error().is_some()).count();
        info!(total = reports.len(), failed, "gene reports assembled");
        reports
    }

    /// [`Self::assemble`] plus the summary table and a timestamp.
    pub async fn assemble_batch(&self, symbols: &[GeneSymbol]) -> BatchReport {
        BatchReport::from_reports(self.assemble(symbols).await)
    }

    pub async fn assemble_one(&self, symbol: GeneSymbol) -> GeneReport {
        let target = match self.sources.targets.lookup_one(&symbol).await {
            Ok(target) => target,
            Err(error) => {
                warn!(gene = %symbol, %error, "target lookup failed");
                return GeneReport::Failed { symbol, error };
            }
        };

        let accession = target.primary_accession_id.as_deref();
        let (drugs, structure) = tokio::join!(
            self.sources.drugs.fetch(accession),
            self.sources.structures.resolve(accession),
        );

        GeneReport::Composite {
            symbol,
            target,
            drugs,
            structure,
        }
    }
}
