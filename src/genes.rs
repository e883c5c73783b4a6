//! Gene symbol normalisation for user-supplied query strings.

use std::{borrow::Borrow, fmt};

use indexmap::IndexSet;
use serde::Serialize;

/// Trimmed, upper-cased gene symbol used as the lookup key for a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GeneSymbol(String);

impl GeneSymbol {
    /// Normalise a single token; `None` when it is blank.
    pub fn parse(raw: &str) -> Option<Self> {
        let token = raw.trim();
        if token.is_empty() {
            return None;
        }
        Some(Self(token.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for GeneSymbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GeneSymbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Split a comma separated query into unique symbols, keeping first-occurrence order.
///
/// Blank input yields an empty list.
pub fn normalize(input: &str) -> Vec<GeneSymbol> {
    normalize_all([input])
}

/// Same as [`normalize`] over several raw inputs, each of which may itself hold commas.
pub fn normalize_all<I, S>(inputs: I) -> Vec<GeneSymbol>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = IndexSet::new();
    for input in inputs {
        for token in input.as_ref().split(',') {
            if let Some(symbol) = GeneSymbol::parse(token) {
                seen.insert(symbol);
            }
        }
    }
    seen.into_iter().collect()
}
