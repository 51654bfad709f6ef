pub mod assessment;
pub mod backend;
pub mod config;
pub mod config_file;
pub mod income;
pub mod layout;

// Re-export for convenience
pub use assessment::{Assessment, CREDITWORTHY_THRESHOLD};
pub use backend::{BackendError, TableBackend};
pub use config::{ExtractorConfig, ExtractorConfigBuilder, ListOverride, MarkerMatch};
pub use config_file::{ConfigError, ConfigFile, load_config, save_config};
pub use income::{CreditSummary, IncomeExtractor, extract_total_credit, parse_amount};
pub use layout::{LayoutConfig, TextSpan, detect_tables};

/// A single table cell. `None` means the cell is absent.
pub type Cell = Option<String>;

/// A table as a grid of cells. Row 0 is the header row; rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a table from string literals, treating `""` as an absent cell.
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|s| {
                        let s = s.as_ref();
                        if s.is_empty() {
                            None
                        } else {
                            Some(s.to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn header(&self) -> Option<&[Cell]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Rows after the header.
    pub fn data_rows(&self) -> &[Vec<Cell>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as tab-separated rows, absent cells as empty fields.
    pub fn to_tsv(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_deref().unwrap_or("").replace('\t', " "))
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The tables detected on one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageTables {
    /// 1-based page number.
    pub page_number: usize,
    pub tables: Vec<Table>,
}
