//! Runs the MuPDF backend against a small hand-written statement PDF.

use flexrent_core::{BackendError, IncomeExtractor, TableBackend};
use flexrent_pdf_mupdf::MupdfBackend;
use mupdf::pdf::{Encryption, PdfDocument, PdfWriteOptions};

const USER_PASSWORD: &str = "1234";

/// Build a single-page PDF whose content stream is `content`, with
/// Helvetica available as `/F1`.
fn build_pdf(content: &str) -> Vec<u8> {
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len() + 1,
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}

fn text_at(x: u32, y: u32, text: &str) -> String {
    format!("BT /F1 10 Tf {x} {y} Td ({text}) Tj ET\n")
}

fn statement_pdf() -> Vec<u8> {
    let mut content = text_at(50, 760, "ACME BANK STATEMENT");
    let columns = [50, 150, 300, 400];
    let rows: [[&str; 4]; 3] = [
        ["Date", "Description", "Credit", "Debit"],
        ["01/01", "Salary", "50,000.00", "-"],
        ["02/01", "Transfer", "12,500.50", ""],
    ];
    for (r, row) in rows.iter().enumerate() {
        let y = 700 - r as u32 * 20;
        for (x, text) in columns.iter().zip(row.iter()) {
            if !text.is_empty() {
                content.push_str(&text_at(*x, y, text));
            }
        }
    }
    build_pdf(&content)
}

/// Re-save `pdf` with AES-128 encryption and a user password.
fn encrypt(pdf: &[u8]) -> Vec<u8> {
    let document = PdfDocument::from_bytes(pdf).expect("fixture should parse");
    let mut options = PdfWriteOptions::default();
    options
        .set_encryption(Encryption::Aes128)
        .set_user_password(USER_PASSWORD)
        .set_owner_password("bank-owner");

    let mut out = Vec::new();
    document
        .write_to_with_options(&mut out, options)
        .expect("encrypted fixture should serialize");
    out
}

#[test]
fn finds_the_transaction_table() {
    let pages = MupdfBackend::new()
        .extract_tables(&statement_pdf(), None)
        .expect("statement should open");

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].page_number, 1);
    assert_eq!(pages[0].tables.len(), 1);

    let table = &pages[0].tables[0];
    assert_eq!(table.len(), 3);
    assert_eq!(table.rows[0][2].as_deref(), Some("Credit"));
    assert_eq!(table.rows[2][3], None);
}

#[test]
fn sums_the_credit_column() {
    let pages = MupdfBackend::new()
        .extract_tables(&statement_pdf(), None)
        .unwrap();
    let summary = IncomeExtractor::new().summarize_pages(&pages);
    assert_eq!(summary.total, 62_500.5);
}

#[test]
fn password_is_ignored_for_unencrypted_documents() {
    let pages = MupdfBackend::new()
        .extract_tables(&statement_pdf(), Some("secret"))
        .unwrap();
    assert_eq!(pages.len(), 1);
}

#[test]
fn encrypted_statement_without_password() {
    let err = MupdfBackend::new()
        .extract_tables(&encrypt(&statement_pdf()), None)
        .unwrap_err();
    assert!(matches!(err, BackendError::PasswordRequired));
    assert!(err.is_password_error());
}

#[test]
fn encrypted_statement_with_wrong_password() {
    let err = MupdfBackend::new()
        .extract_tables(&encrypt(&statement_pdf()), Some("0000"))
        .unwrap_err();
    assert!(matches!(err, BackendError::IncorrectPassword));
}

#[test]
fn encrypted_statement_with_password() {
    let pages = MupdfBackend::new()
        .extract_tables(&encrypt(&statement_pdf()), Some(USER_PASSWORD))
        .unwrap();
    let summary = IncomeExtractor::new().summarize_pages(&pages);
    assert_eq!(summary.total, 62_500.5);
}
