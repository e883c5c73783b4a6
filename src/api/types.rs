//! Request DTOs for the JSON API.

use serde::Deserialize;

use crate::genes::{self, GeneSymbol};

/// Body of `POST /reports`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub genes: GenesInput,
}

/// Genes as typed by a user (`"EGFR, TP53"`) or as a JSON list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GenesInput {
    Text(String),
    List(Vec<String>),
}

impl GenesInput {
    pub fn symbols(&self) -> Vec<GeneSymbol> {
        match self {
            Self::Text(text) => genes::normalize(text),
            Self::List(items) => genes::normalize_all(items),
        }
    }
}
