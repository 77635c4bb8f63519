//! Console and CSV output for accepted records.

use crate::error::{PubmedError, Result};
use crate::record::PaperRecord;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// CSV column order
pub const CSV_COLUMNS: &[&str] = &[
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Authors",
    "Company Affiliations",
    "Corresponding Author Email",
];

const LIST_SEPARATOR: &str = ", ";
const RULE_WIDTH: usize = 80;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "PubmedID")]
    id: &'a str,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Publication Date")]
    publication_year: &'a str,
    #[serde(rename = "Non-academic Authors")]
    non_academic_authors: String,
    #[serde(rename = "Company Affiliations")]
    company_affiliations: String,
    #[serde(rename = "Corresponding Author Email")]
    corresponding_email: &'a str,
}

impl<'a> From<&'a PaperRecord> for CsvRow<'a> {
    fn from(record: &'a PaperRecord) -> Self {
        Self {
            id: &record.id,
            title: &record.title,
            publication_year: &record.publication_year,
            non_academic_authors: record.non_academic_authors.join(LIST_SEPARATOR),
            company_affiliations: record.company_affiliations.join(LIST_SEPARATOR),
            corresponding_email: &record.corresponding_email,
        }
    }
}

fn join_or_na(values: &[String]) -> String {
    if values.is_empty() {
        "N/A".to_string()
    } else {
        values.join(LIST_SEPARATOR)
    }
}

/// Render records as ruled console blocks.
pub fn render_console(records: &[PaperRecord]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    for record in records {
        let email = if record.corresponding_email.is_empty() {
            "N/A"
        } else {
            record.corresponding_email.as_str()
        };

        out.push_str(&format!(
            "\n{rule}\n\
             PubMed ID: {}\n\
             Title: {}\n\
             Publication Date: {}\n\
             Non-academic Authors: {}\n\
             Company Affiliations: {}\n\
             Corresponding Author Email: {}\n\
             {rule}\n",
            record.id,
            record.title,
            record.publication_year,
            join_or_na(&record.non_academic_authors),
            join_or_na(&record.company_affiliations),
            email,
        ));
    }

    out
}

/// Write records to `writer` as CSV with a header row.
pub fn write_csv_to<W: std::io::Write>(writer: W, records: &[PaperRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(PubmedError::Validation("No records to export".to_string()));
    }

    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in records {
        wtr.serialize(CsvRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write records to a CSV file.
///
/// The CSV is built in memory first, so the file is only created once
/// there is something to write.
///
/// # Errors
///
/// Refuses an empty slice instead of producing a header-only file.
pub fn write_csv(path: &Path, records: &[PaperRecord]) -> Result<()> {
    let mut buf = Vec::new();
    write_csv_to(&mut buf, records)?;
    std::fs::write(path, buf)?;
    info!(path = %path.display(), count = records.len(), "Saved CSV");
    Ok(())
}
