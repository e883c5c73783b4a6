//! Caller-owned store for the most recent batch.

use std::collections::HashMap;

use tracing::debug;

use super::{BatchReport, GeneReport};
use crate::genes::GeneSymbol;

/// Keeps the last submitted batch so detail views and downloads can be served
/// without re-running the lookups. A new submission replaces everything.
#[derive(Debug, Default)]
pub struct ReportCache {
    latest: Option<BatchReport>,
    index: HashMap<GeneSymbol, usize>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate the previous batch and store `batch` in its place.
    pub fn replace(&mut self, batch: BatchReport) {
        self.clear();
        self.index = batch
            .reports
            .iter()
            .enumerate()
            .map(|(idx, report)| (report.symbol().clone(), idx))
            .collect();
        debug!(genes = self.index.len(), "cached batch");
        self.latest = Some(batch);
    }

    pub fn clear(&mut self) {
        self.latest = None;
        self.index.clear();
    }

    pub fn latest(&self) -> Option<&BatchReport> {
        self.latest.as_ref()
    }

    /// Report for a symbol; the lookup normalises `symbol` first.
    pub fn get(&self, symbol: &str) -> Option<&GeneReport> {
        let symbol = GeneSymbol::parse(symbol)?;
        let idx = *self.index.get(&symbol)?;
        self.latest.as_ref()?.reports.get(idx)
    }

    /// Download name and bytes of the cached structure for a symbol.
    pub fn structure(&self, symbol: &str) -> Option<(String, &[u8])> {
        self.get(symbol)?.structure_file()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::composite;

    #[test]
    fn lookups_normalise_the_symbol() {
        let mut cache = ReportCache::new();
        cache.replace(BatchReport::from_reports(vec![
            composite("egfr", Some("P00533")),
            composite("tp53", None),
        ]));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(" egfr ").unwrap().symbol().as_str(), "EGFR");
        let (name, bytes) = cache.structure("EGFR").unwrap();
        assert_eq!(name, "AF_EGFR_P00533.pdb");
        assert_eq!(bytes, b"ATOM");
        assert!(cache.structure("tp53").is_none());
        assert!(cache.get("kras").is_none());
    }

    #[test]
    fn new_batch_invalidates_old_entries() {
        let mut cache = ReportCache::new();
        cache.replace(BatchReport::from_reports(vec![composite("egfr", Some("P00533"))]));
        cache.replace(BatchReport::from_reports(vec![composite("brca1", None)]));

        assert!(cache.get("EGFR").is_none());
        assert!(cache.get("BRCA1").is_some());
        assert_eq!(cache.latest().unwrap().reports.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.latest().is_none());
    }
}
