//! Mock table backend for handler tests.

use std::sync::{Arc, Mutex};

use flexrent_core::{BackendError, PageTables, TableBackend};

/// What a [`MockBackend`] does with every call.
#[derive(Clone, Debug)]
pub enum MockOutcome {
    /// Return these pages regardless of password.
    Pages(Vec<PageTables>),
    /// Behave like an encrypted PDF that opens only with `password`.
    Locked {
        password: String,
        pages: Vec<PageTables>,
    },
    /// Fail to open with this message.
    Fail(String),
}

/// A hand-rolled mock implementing [`TableBackend`] that records the
/// password passed to each call.
pub struct MockBackend {
    outcome: MockOutcome,
    calls: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockBackend {
    pub fn new(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle on the recorded passwords, one entry per call.
    pub fn calls(&self) -> Arc<Mutex<Vec<Option<String>>>> {
        self.calls.clone()
    }
}

impl TableBackend for MockBackend {
    fn extract_tables(
        &self,
        _data: &[u8],
        password: Option<&str>,
    ) -> Result<Vec<PageTables>, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push(password.map(str::to_string));

        match &self.outcome {
            MockOutcome::Pages(pages) => Ok(pages.clone()),
            MockOutcome::Locked {
                password: expected,
                pages,
            } => match password {
                None => Err(BackendError::PasswordRequired),
                Some(given) if given == expected.as_str() => Ok(pages.clone()),
                Some(_) => Err(BackendError::IncorrectPassword),
            },
            MockOutcome::Fail(message) => Err(BackendError::OpenError(message.clone())),
        }
    }
}
