//! Table detection from positioned text.
//!
//! Coordinates follow MuPDF device space: `y` grows downward, so sorting by
//! ascending `y` walks the page top to bottom.

use std::cmp::Ordering;

use crate::{Cell, Table};

/// A run of text on one baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    /// Left edge.
    pub x0: f32,
    /// Right edge.
    pub x1: f32,
    /// Baseline.
    pub y: f32,
    pub font_size: f32,
}

impl TextSpan {
    fn center(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }
}

/// Thresholds for grouping spans into tables.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Spans whose baselines differ by less than this fraction of the average
    /// font size share a line (default 0.5).
    pub row_tolerance: f32,
    /// Minimum spans for a line to count as a table row (default 2).
    pub min_columns: usize,
    /// Minimum consecutive table rows, header included (default 2).
    pub min_rows: usize,
    /// Horizontal slack in points when merging span extents into columns (default 2.0).
    pub column_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_tolerance: 0.5,
            min_columns: 2,
            min_rows: 2,
            column_gap: 2.0,
        }
    }
}

/// Detect tables among the spans of a single page.
///
/// A table is a maximal run of consecutive lines that each hold at least
/// `min_columns` spans. Its columns are the disjoint horizontal intervals
/// formed by merging every span's extent in the run.
pub fn detect_tables(spans: Vec<TextSpan>, config: &LayoutConfig) -> Vec<Table> {
    let spans: Vec<TextSpan> = spans
        .into_iter()
        .filter(|s| !s.text.trim().is_empty())
        .collect();

    if spans.is_empty() {
        return Vec::new();
    }

    let avg_font_size = spans.iter().map(|s| s.font_size).sum::<f32>() / spans.len() as f32;
    let lines = cluster_into_lines(spans, avg_font_size * config.row_tolerance);

    let mut tables = Vec::new();
    let mut run: Vec<Vec<TextSpan>> = Vec::new();

    for line in lines {
        if line.len() >= config.min_columns.max(1) {
            run.push(line);
        } else {
            flush_run(&mut run, config, &mut tables);
        }
    }
    flush_run(&mut run, config, &mut tables);

    tables
}

fn flush_run(run: &mut Vec<Vec<TextSpan>>, config: &LayoutConfig, tables: &mut Vec<Table>) {
    if run.len() >= config.min_rows.max(1) {
        let lines = std::mem::take(run);
        let columns = detect_columns(&lines, config.column_gap);
        tables.push(Table::new(assign_to_columns(lines, &columns)));
    } else {
        run.clear();
    }
}

fn by_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Group spans into lines by baseline, top to bottom, each sorted left to right.
fn cluster_into_lines(mut spans: Vec<TextSpan>, tolerance: f32) -> Vec<Vec<TextSpan>> {
    spans.sort_by(|a, b| by_f32(a.y, b.y).then(by_f32(a.x0, b.x0)));

    let mut lines: Vec<Vec<TextSpan>> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    for line in &mut lines {
        line.sort_by(|a, b| by_f32(a.x0, b.x0));
    }
    lines
}

/// Merge span extents into disjoint column intervals, left to right.
fn detect_columns(lines: &[Vec<TextSpan>], gap: f32) -> Vec<(f32, f32)> {
    let mut extents: Vec<(f32, f32)> = lines
        .iter()
        .flat_map(|line| line.iter().map(|s| (s.x0, s.x1.max(s.x0))))
        .collect();
    extents.sort_by(|a, b| by_f32(a.0, b.0));

    let mut columns: Vec<(f32, f32)> = Vec::new();
    for (x0, x1) in extents {
        match columns.last_mut() {
            Some(last) if x0 <= last.1 + gap => last.1 = last.1.max(x1),
            _ => columns.push((x0, x1)),
        }
    }
    columns
}

fn column_for(span: &TextSpan, columns: &[(f32, f32)]) -> usize {
    let center = span.center();
    if let Some(idx) = columns
        .iter()
        .position(|&(x0, x1)| center >= x0 && center <= x1)
    {
        return idx;
    }
    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let da = (center - a.0).abs().min((center - a.1).abs());
            let db = (center - b.0).abs().min((center - b.1).abs());
            by_f32(da, db)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn assign_to_columns(lines: Vec<Vec<TextSpan>>, columns: &[(f32, f32)]) -> Vec<Vec<Cell>> {
    lines
        .into_iter()
        .map(|line| {
            let mut cells: Vec<Cell> = vec![None; columns.len()];
            for span in line {
                let idx = column_for(&span, columns);
                let text = span.text.trim();
                let slot = &mut cells[idx];
                match slot {
                    Some(existing) => {
                        existing.push(' ');
                        existing.push_str(text);
                    }
                    None => *slot = Some(text.to_string()),
                }
            }
            cells
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x0: f32, x1: f32, y: f32) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            x0,
            x1,
            y,
            font_size: 10.0,
        }
    }

    fn cell(s: &str) -> Cell {
        Some(s.to_string())
    }

    #[test]
    fn test_simple_table() {
        let spans = vec![
            span("Date", 10.0, 40.0, 100.0),
            span("Credit", 100.0, 140.0, 100.0),
            span("01/01", 10.0, 38.0, 115.0),
            span("50,000.00", 95.0, 140.0, 115.0),
        ];

        let tables = detect_tables(spans, &LayoutConfig::default());

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows[0], vec![cell("Date"), cell("Credit")]);
        assert_eq!(tables[0].rows[1], vec![cell("01/01"), cell("50,000.00")]);
    }

    #[test]
    fn test_line_clustering_tolerates_baseline_jitter() {
        let spans = vec![
            span("A", 0.0, 10.0, 100.0),
            span("B", 50.0, 60.0, 101.5),
            span("C", 0.0, 10.0, 120.0),
        ];

        let lines = cluster_into_lines(spans, 5.0);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[1].len(), 1);
    }

    #[test]
    fn test_missing_cell_is_none() {
        let spans = vec![
            span("Date", 10.0, 40.0, 100.0),
            span("Debit", 100.0, 130.0, 100.0),
            span("Credit", 200.0, 240.0, 100.0),
            span("01/01", 10.0, 38.0, 115.0),
            span("7,500", 205.0, 240.0, 115.0),
        ];

        let tables = detect_tables(spans, &LayoutConfig::default());

        assert_eq!(tables[0].rows[1], vec![cell("01/01"), None, cell("7,500")]);
    }

    #[test]
    fn test_single_span_lines_split_tables() {
        let spans = vec![
            span("ACME BANK STATEMENT", 10.0, 200.0, 20.0),
            span("Date", 10.0, 40.0, 60.0),
            span("Credit", 100.0, 140.0, 60.0),
            span("01/01", 10.0, 38.0, 75.0),
            span("100", 120.0, 140.0, 75.0),
            span("Page 1 of 2", 10.0, 80.0, 400.0),
        ];

        let tables = detect_tables(spans, &LayoutConfig::default());

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].len(), 2);
    }

    #[test]
    fn test_lone_row_is_not_a_table() {
        let spans = vec![
            span("Account", 10.0, 50.0, 60.0),
            span("0123456789", 100.0, 160.0, 60.0),
        ];
        assert!(detect_tables(spans, &LayoutConfig::default()).is_empty());
    }

    #[test]
    fn test_spans_in_same_column_are_joined() {
        let spans = vec![
            span("Date", 10.0, 40.0, 100.0),
            span("Description", 60.0, 130.0, 100.0),
            span("Credit", 200.0, 240.0, 100.0),
            span("01/01", 10.0, 38.0, 115.0),
            span("Salary", 60.0, 90.0, 115.0),
            span("March", 92.0, 120.0, 115.0),
            span("9", 230.0, 240.0, 115.0),
        ];

        let tables = detect_tables(spans, &LayoutConfig::default());

        assert_eq!(
            tables[0].rows[1],
            vec![cell("01/01"), cell("Salary March"), cell("9")]
        );
    }

    #[test]
    fn test_blank_spans_are_ignored() {
        let spans = vec![span("   ", 0.0, 5.0, 0.0)];
        assert!(detect_tables(spans, &LayoutConfig::default()).is_empty());
    }

    #[test]
    fn test_zero_min_rows_never_yields_empty_tables() {
        let spans = vec![
            span("ACME BANK STATEMENT", 10.0, 200.0, 20.0),
            span("Date", 10.0, 40.0, 60.0),
            span("Credit", 100.0, 140.0, 60.0),
            span("Page 1 of 2", 10.0, 80.0, 400.0),
        ];
        let config = LayoutConfig {
            min_rows: 0,
            ..LayoutConfig::default()
        };

        let tables = detect_tables(spans, &config);

        assert_eq!(tables.len(), 1);
        assert!(tables.iter().all(|t| !t.is_empty()));
    }
}
