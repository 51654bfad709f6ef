use flexrent_core::Assessment;
use serde::Serialize;

pub const LIVENESS_STATUS: &str = "FlexRent Parser is Live";
pub const SUCCESS_MESSAGE: &str = "Analysis successful";
pub const PASSWORD_MESSAGE: &str = "This PDF is password protected.";

// ── Analyze responses ───────────────────────────────────────────────────

/// Body of every `/analyze` reply. Serialized without a tag, so each
/// variant's fields appear at the top level.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalyzeResponse {
    Success(AnalysisJson),
    PasswordRequired(StatusMessageJson),
    Error(ErrorJson),
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisJson {
    pub filename: String,
    pub total_income: f64,
    pub is_creditworthy: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusMessageJson {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorJson {
    pub status: String,
    pub error: String,
}

impl AnalyzeResponse {
    pub fn success(filename: String, assessment: &Assessment) -> Self {
        AnalyzeResponse::Success(AnalysisJson {
            filename,
            total_income: assessment.total_income,
            is_creditworthy: assessment.is_creditworthy,
            message: SUCCESS_MESSAGE.to_string(),
        })
    }

    pub fn password_required() -> Self {
        AnalyzeResponse::PasswordRequired(StatusMessageJson {
            status: "password_required".to_string(),
            message: PASSWORD_MESSAGE.to_string(),
        })
    }

    pub fn error(error: impl Into<String>) -> Self {
        AnalyzeResponse::Error(ErrorJson {
            status: "error".to_string(),
            error: error.into(),
        })
    }
}

// ── Liveness ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct HealthJson {
    pub status: &'static str,
}
