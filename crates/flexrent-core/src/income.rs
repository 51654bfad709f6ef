//! Credit-column income extraction.
//!
//! Each table's first row is its header. The first header that names a credit
//! column (and is not a balance column) is selected, and every numeric cell
//! beneath it is added to the total. Cells that do not parse are skipped, so
//! a noisy statement degrades to a smaller total rather than an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::{ExtractorConfig, MarkerMatch};
use crate::{Cell, PageTables, Table};

/// Stand-in for an absent header cell. Contains no credit keyword.
pub const MISSING_HEADER: &str = "none";

static NON_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.]").unwrap());
static HEADER_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[[:alnum:]]+").unwrap());

/// Counters collected while summing a statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreditSummary {
    pub total: f64,
    /// Tables with at least one data row.
    pub tables_scanned: usize,
    pub tables_with_credit_column: usize,
    pub parsed_cells: usize,
    /// Non-empty credit cells that did not parse as a number.
    pub skipped_cells: usize,
}

impl CreditSummary {
    fn absorb(&mut self, other: CreditSummary) {
        self.total += other.total;
        self.tables_scanned += other.tables_scanned;
        self.tables_with_credit_column += other.tables_with_credit_column;
        self.parsed_cells += other.parsed_cells;
        self.skipped_cells += other.skipped_cells;
    }
}

/// Sums the credit column of every table.
#[derive(Debug, Clone, Default)]
pub struct IncomeExtractor {
    config: ExtractorConfig,
}

impl IncomeExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Total of all parsed credit amounts across `tables`.
    pub fn extract_total_credit(&self, tables: &[Table]) -> f64 {
        self.summarize(tables).total
    }

    /// Same fold as [`extract_total_credit`](Self::extract_total_credit),
    /// keeping the cell and table counts.
    pub fn summarize(&self, tables: &[Table]) -> CreditSummary {
        let mut summary = CreditSummary::default();
        for table in tables {
            summary.absorb(self.summarize_table(table));
        }
        summary
    }

    /// Summarize every table of every page, in page order.
    pub fn summarize_pages(&self, pages: &[PageTables]) -> CreditSummary {
        let mut summary = CreditSummary::default();
        for page in pages {
            summary.absorb(self.summarize(&page.tables));
        }
        summary
    }

    /// Index of the credit column in `header`, if any.
    pub fn credit_column(&self, header: &[Cell]) -> Option<usize> {
        header
            .iter()
            .map(normalize_header)
            .position(|name| self.is_credit_header(&name))
    }

    /// Whether an already-normalized header names a credit column.
    pub fn is_credit_header(&self, name: &str) -> bool {
        if self
            .config
            .exclude_keywords
            .iter()
            .any(|k| name.contains(k.as_str()))
        {
            return false;
        }

        if self
            .config
            .credit_keywords
            .iter()
            .any(|k| name.contains(k.as_str()))
        {
            return true;
        }

        match self.config.marker_match {
            MarkerMatch::Substring => self
                .config
                .short_markers
                .iter()
                .any(|m| name.contains(m.as_str())),
            MarkerMatch::Token => {
                let words = header_words(name);
                self.config
                    .short_markers
                    .iter()
                    .any(|m| contains_words(&words, &header_words(m)))
            }
        }
    }

    fn summarize_table(&self, table: &Table) -> CreditSummary {
        let mut summary = CreditSummary::default();

        let Some(header) = table.header() else {
            return summary;
        };
        if table.len() < 2 {
            return summary;
        }
        summary.tables_scanned = 1;

        let Some(column) = self.credit_column(header) else {
            tracing::trace!(columns = header.len(), "no credit column in table");
            return summary;
        };
        summary.tables_with_credit_column = 1;

        for row in table.data_rows() {
            let Some(Some(raw)) = row.get(column) else {
                continue;
            };
            if raw.is_empty() {
                continue;
            }
            match parse_amount(raw) {
                Some(value) => {
                    summary.total += value;
                    summary.parsed_cells += 1;
                }
                None => {
                    tracing::trace!(cell = %raw, "skipping unparseable credit cell");
                    summary.skipped_cells += 1;
                }
            }
        }

        summary
    }
}

fn header_words(text: &str) -> Vec<&str> {
    HEADER_TOKEN.find_iter(text).map(|t| t.as_str()).collect()
}

/// Whether `marker` occurs in `words` as a contiguous run. A marker with no
/// alphanumeric words never matches.
fn contains_words(words: &[&str], marker: &[&str]) -> bool {
    !marker.is_empty() && words.windows(marker.len()).any(|w| w == marker)
}

/// Lowercase a header cell; absent cells become [`MISSING_HEADER`].
pub fn normalize_header(cell: &Cell) -> String {
    match cell {
        Some(text) => text.to_lowercase(),
        None => MISSING_HEADER.to_string(),
    }
}

/// Strip everything except ASCII digits and `.`, then parse as `f64`.
///
/// `"₦50,000.00"` and `"50,000.00"` both give `50000.0`; `"N/A"`, `"-"`
/// and `"1.2.3"` give `None`. A leading minus sign is stripped too.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = NON_NUMERIC.replace_all(raw, "");
    cleaned.parse::<f64>().ok()
}

/// [`IncomeExtractor::extract_total_credit`] with the default configuration.
pub fn extract_total_credit(tables: &[Table]) -> f64 {
    IncomeExtractor::new().extract_total_credit(tables)
}
