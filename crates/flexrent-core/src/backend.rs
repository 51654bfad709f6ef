use thiserror::Error;

use crate::PageTables;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("PDF is encrypted and requires a password")]
    PasswordRequired,
    #[error("the supplied password is incorrect")]
    IncorrectPassword,
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract tables: {0}")]
    ExtractionError(String),
}

impl BackendError {
    /// True for both the missing-password and the wrong-password case.
    pub fn is_password_error(&self) -> bool {
        matches!(
            self,
            BackendError::PasswordRequired | BackendError::IncorrectPassword
        )
    }
}

/// Trait for PDF table extraction backends.
///
/// Implementors open the document (authenticating with `password` when the
/// PDF is encrypted) and return the tables found on every page, in page
/// order. Summing the credit column is left to
/// [`IncomeExtractor`](crate::IncomeExtractor).
pub trait TableBackend: Send + Sync {
    /// Extract all tables from an in-memory PDF.
    fn extract_tables(
        &self,
        data: &[u8],
        password: Option<&str>,
    ) -> Result<Vec<PageTables>, BackendError>;
}
