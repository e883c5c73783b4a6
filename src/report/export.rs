//! Writes batch artefacts to disk.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::info;

use super::{render, BatchReport};

/// Save every available structure file into `dir`, one file per gene.
pub fn write_structures(batch: &BatchReport, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("create {dir:?}"))?;
    let mut written = Vec::new();
    for report in &batch.reports {
        let Some((name, bytes)) = report.structure_file() else {
            continue;
        };
        let path = dir.join(name);
        fs::write(&path, bytes).with_context(|| format!("write {path:?}"))?;
        info!(
            gene = %report.symbol(),
            path = %path.display(),
            size = bytes.len(),
            "saved structure"
        );
        written.push(path);
    }
    Ok(written)
}

/// Save the summary table as CSV at `path`.
pub fn write_summary(batch: &BatchReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("create {path:?}"))?;
    render::write_summary_csv(&batch.summary, file)?;
    info!(path = %path.display(), rows = batch.summary.len(), "saved summary table");
    Ok(())
}
