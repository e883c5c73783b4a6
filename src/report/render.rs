//! Text, JSON, CSV and HTML views of a batch.

use std::{fmt::Write as _, io};

use anyhow::Result;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

use super::{BatchReport, GeneReport, SummaryRow};
use crate::data::pharos::NOT_AVAILABLE;

const NO_DATA: &str = "no data found";

/// Plain-text report: one section per gene followed by the summary table.
pub fn render_text(batch: &BatchReport, top_drugs: usize) -> String {
    let mut out = String::new();
    for report in &batch.reports {
        render_gene(&mut out, report, top_drugs);
    }

    let _ = writeln!(
        out,
        "Summary ({} of {} genes resolved)",
        batch.summary.len(),
        batch.reports.len()
    );
    if batch.summary.is_empty() {
        let _ = writeln!(out, "  {NO_DATA}");
    } else {
        let rows: Vec<Vec<String>> = batch
            .summary
            .iter()
            .map(|row| {
                vec![
                    row.symbol.to_string(),
                    row.development_level.to_string(),
                    row.family.clone(),
                    or_na(row.accession_id.as_deref()),
                ]
            })
            .collect();
        out.push_str(&table(&["Gene", "Level", "Family", "Accession"], rows, "  "));
    }
    out
}

fn render_gene(out: &mut String, report: &GeneReport, top_drugs: usize) {
    let target = match report {
        GeneReport::Failed { symbol, error } => {
            let _ = writeln!(out, "⚠ {symbol}: {error}\n");
            return;
        }
        GeneReport::Composite { target, .. } => target,
    };

    let _ = writeln!(out, "## {} Report", report.symbol());
    let _ = writeln!(out, "  Name:   {}", target.display_name);
    let _ = writeln!(
        out,
        "  Family: {} | Level: {} | Drugs: {} | Diseases: {}",
        target.family,
        target.development_level,
        report.drugs().map_or(0, |d| d.known_drug_count),
        report.drugs().map_or(0, |d| d.associated_disease_count),
    );

    let _ = writeln!(out, "  Clinical drugs (top {top_drugs}):");
    match report.drugs().filter(|d| !d.drugs.is_empty()) {
        Some(association) => {
            let rows: Vec<Vec<String>> = association
                .top(top_drugs)
                .iter()
                .map(|row| {
                    vec![
                        row.name.clone(),
                        row.phase_label(),
                        or_na(row.status.as_deref()),
                    ]
                })
                .collect();
            out.push_str(&table(&["Name", "Phase", "Status"], rows, "    "));
        }
        None => {
            let _ = writeln!(out, "    {NO_DATA}");
        }
    }

    let _ = writeln!(out, "  Recent publications:");
    if target.publications.is_empty() {
        let _ = writeln!(out, "    {NO_DATA}");
    }
    for publication in &target.publications {
        let _ = writeln!(
            out,
            "    [{}] {} ({}, PMID {})",
            or_na(publication.year.as_deref()),
            publication.title,
            publication.journal,
            publication.id
        );
    }

    match report.structure().and_then(|s| s.source_url.as_deref()) {
        Some(url) => {
            let size = report.structure().map_or(0, |s| s.size());
            let _ = writeln!(out, "  AlphaFold structure: {url} ({size} bytes)");
        }
        None => {
            let _ = writeln!(out, "  AlphaFold structure: {NO_DATA}");
        }
    }
    out.push('\n');
}

/// Bordered table with every line prefixed by `indent`.
fn table(header: &[&str], rows: Vec<Vec<String>>, indent: &str) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.to_vec());
    for row in rows {
        table.add_row(row);
    }

    let mut out = String::new();
    for line in table.lines() {
        let _ = writeln!(out, "{indent}{line}");
    }
    out
}

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

pub fn render_json(batch: &BatchReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(batch)?)
}

/// Write the summary table as CSV.
pub fn write_summary_csv<W: io::Write>(rows: &[SummaryRow], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["Gene", "Level", "Family", "Accession", "StructureUrl"])?;
    for row in rows {
        writer.write_record([
            row.symbol.as_str(),
            row.development_level.code(),
            row.family.as_str(),
            row.accession_id.as_deref().unwrap_or(NOT_AVAILABLE),
            row.structure_url.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(feature = "askama")]
pub use html::render_html;

#[cfg(feature = "askama")]
mod html {
    use anyhow::Result;
    use askama::Template;

    use super::{or_na, BatchReport, GeneReport};

    #[derive(Template)]
    #[template(path = "report.html")]
    struct HtmlReport {
        generated_at: String,
        top_drugs: usize,
        cards: Vec<Card>,
        summary: Vec<SummaryCells>,
    }

    struct SummaryCells {
        gene: String,
        level: String,
        family: String,
        accession: String,
    }

    struct DrugCells {
        name: String,
        phase: String,
        status: String,
    }

    struct PublicationCells {
        year: String,
        title: String,
        journal: String,
    }

    struct Card {
        symbol: String,
        failed: bool,
        message: String,
        name: String,
        family: String,
        level: String,
        drug_count: u64,
        disease_count: u64,
        drugs: Vec<DrugCells>,
        publications: Vec<PublicationCells>,
        structure_url: String,
        structure_file: String,
    }

    impl Card {
        fn from_report(report: &GeneReport, top_drugs: usize) -> Self {
            let mut card = Card {
                symbol: report.symbol().to_string(),
                failed: false,
                message: String::new(),
                name: String::new(),
                family: String::new(),
                level: String::new(),
                drug_count: 0,
                disease_count: 0,
                drugs: Vec::new(),
                publications: Vec::new(),
                structure_url: String::new(),
                structure_file: String::new(),
            };
            let Some(target) = report.target() else {
                card.failed = true;
                card.message = report.error().map(ToString::to_string).unwrap_or_default();
                return card;
            };

            card.name = target.display_name.clone();
            card.family = target.family.clone();
            card.level = target.development_level.to_string();
            if let Some(association) = report.drugs() {
                card.drug_count = association.known_drug_count;
                card.disease_count = association.associated_disease_count;
                card.drugs = association
                    .top(top_drugs)
                    .iter()
                    .map(|d| DrugCells {
                        name: d.name.clone(),
                        phase: d.phase_label(),
                        status: or_na(d.status.as_deref()),
                    })
                    .collect();
            }
            card.publications = target
                .publications
                .iter()
                .map(|p| PublicationCells {
                    year: or_na(p.year.as_deref()),
                    title: p.title.clone(),
                    journal: p.journal.clone(),
                })
                .collect();
            if let Some(url) = report.structure().and_then(|s| s.source_url.clone()) {
                card.structure_url = url;
            }
            if let Some((name, _)) = report.structure_file() {
                card.structure_file = name;
            }
            card
        }
    }

    /// Standalone HTML page for a batch.
    pub fn render_html(batch: &BatchReport, top_drugs: usize) -> Result<String> {
        let page = HtmlReport {
            generated_at: batch.generated_at.to_rfc3339(),
            top_drugs,
            cards: batch
                .reports
                .iter()
                .map(|r| Card::from_report(r, top_drugs))
                .collect(),
            summary: batch
                .summary
                .iter()
                .map(|row| SummaryCells {
                    gene: row.symbol.to_string(),
                    level: row.development_level.to_string(),
                    family: row.family.clone(),
                    accession: or_na(row.accession_id.as_deref()),
                })
                .collect(),
        };
        Ok(page.render()?)
    }
}
