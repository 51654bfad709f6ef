use std::io::Write;

use flexrent_core::{Assessment, CreditSummary, PageTables};
use owo_colors::OwoColorize;
use serde_json::{Value, json};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Format an amount with thousands separators and two decimals.
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

/// Print the verdict and extraction counts for one statement.
pub fn print_assessment(
    w: &mut dyn Write,
    filename: &str,
    pages: usize,
    summary: &CreditSummary,
    assessment: &Assessment,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "Analyzed {} ({} pages)", filename, pages)?;
    writeln!(
        w,
        "Tables: {} scanned, {} with a credit column",
        summary.tables_scanned, summary.tables_with_credit_column
    )?;

    let cells = format!(
        "Credit cells: {} parsed, {} skipped",
        summary.parsed_cells, summary.skipped_cells
    );
    if color.enabled() && summary.skipped_cells > 0 {
        writeln!(w, "{}", cells.yellow())?;
    } else {
        writeln!(w, "{}", cells)?;
    }
    writeln!(w)?;

    writeln!(w, "Total income: {}", format_amount(assessment.total_income))?;
    writeln!(w, "Threshold:    {}", format_amount(assessment.threshold))?;

    let verdict = if assessment.is_creditworthy {
        "CREDITWORTHY"
    } else {
        "NOT CREDITWORTHY"
    };
    if color.enabled() {
        if assessment.is_creditworthy {
            writeln!(w, "Verdict:      {}", verdict.bold().green())?;
        } else {
            writeln!(w, "Verdict:      {}", verdict.bold().red())?;
        }
    } else {
        writeln!(w, "Verdict:      {}", verdict)?;
    }
    Ok(())
}

/// Print every detected table as tab-separated rows, grouped by page.
pub fn print_tables(w: &mut dyn Write, pages: &[PageTables]) -> std::io::Result<()> {
    let mut printed = 0;
    for page in pages {
        for (idx, table) in page.tables.iter().enumerate() {
            if printed > 0 {
                writeln!(w)?;
            }
            writeln!(
                w,
                "# page {}, table {} ({} rows)",
                page.page_number,
                idx + 1,
                table.len()
            )?;
            writeln!(w, "{}", table.to_tsv())?;
            printed += 1;
        }
    }
    if printed == 0 {
        writeln!(w, "No tables detected")?;
    }
    Ok(())
}

// ── JSON output ─────────────────────────────────────────────────────────
//
// Same shapes as the HTTP `/analyze` response, with the extraction counts
// added to the success body.

pub fn analysis_json(filename: &str, summary: &CreditSummary, assessment: &Assessment) -> Value {
    json!({
        "filename": filename,
        "total_income": assessment.total_income,
        "is_creditworthy": assessment.is_creditworthy,
        "message": "Analysis successful",
        "summary": summary,
    })
}

pub fn password_required_json() -> Value {
    json!({
        "status": "password_required",
        "message": "This PDF is password protected.",
    })
}

pub fn error_json(error: &str) -> Value {
    json!({ "status": "error", "error": error })
}

pub fn print_json(w: &mut dyn Write, value: &Value) -> std::io::Result<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    writeln!(w, "{}", rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexrent_core::Table;

    fn render(f: impl FnOnce(&mut dyn Write) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.5), "999.50");
        assert_eq!(format_amount(50_000.0), "50,000.00");
        assert_eq!(format_amount(1_234_567.891), "1,234,567.89");
        assert_eq!(format_amount(-2_500.0), "-2,500.00");
    }

    #[test]
    fn test_print_assessment_plain() {
        let summary = CreditSummary {
            total: 250_000.0,
            tables_scanned: 2,
            tables_with_credit_column: 1,
            parsed_cells: 2,
            skipped_cells: 1,
        };
        let assessment = Assessment::new(250_000.0, 200_000.0);
        let out = render(|w| {
            print_assessment(w, "march.pdf", 3, &summary, &assessment, ColorMode(false))
        });

        assert!(out.contains("Analyzed march.pdf (3 pages)"));
        assert!(out.contains("2 scanned, 1 with a credit column"));
        assert!(out.contains("2 parsed, 1 skipped"));
        assert!(out.contains("Total income: 250,000.00"));
        assert!(out.contains("Verdict:      CREDITWORTHY"));
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn test_print_assessment_not_creditworthy() {
        let assessment = Assessment::new(200_000.0, 200_000.0);
        let out = render(|w| {
            print_assessment(
                w,
                "s.pdf",
                1,
                &CreditSummary::default(),
                &assessment,
                ColorMode(false),
            )
        });
        assert!(out.contains("NOT CREDITWORTHY"));
    }

    #[test]
    fn test_print_tables() {
        let pages = vec![
            PageTables {
                page_number: 1,
                tables: vec![Table::from_strings([["Date", "Credit"], ["01/01", "500"]])],
            },
            PageTables {
                page_number: 2,
                tables: vec![],
            },
        ];
        let out = render(|w| print_tables(w, &pages));
        assert_eq!(out, "# page 1, table 1 (2 rows)\nDate\tCredit\n01/01\t500\n");
    }

    #[test]
    fn test_print_tables_none_detected() {
        let out = render(|w| print_tables(w, &[]));
        assert_eq!(out, "No tables detected\n");
    }

    #[test]
    fn test_json_shapes() {
        let assessment = Assessment::new(50_000.0, 200_000.0);
        let summary = CreditSummary {
            total: 50_000.0,
            parsed_cells: 1,
            ..Default::default()
        };
        let value = analysis_json("s.pdf", &summary, &assessment);
        assert_eq!(value["total_income"], 50_000.0);
        assert_eq!(value["is_creditworthy"], false);
        assert_eq!(value["summary"]["parsed_cells"], 1);

        assert_eq!(password_required_json()["status"], "password_required");
        assert_eq!(error_json("boom")["error"], "boom");
    }
}
