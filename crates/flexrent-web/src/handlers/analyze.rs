use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use flexrent_core::{Assessment, BackendError, CreditSummary};

use crate::models::AnalyzeResponse;
use crate::state::AppState;
use crate::upload;

/// `POST /analyze`: sum the credit column of an uploaded statement.
///
/// Upload problems, including a body that is not a multipart form, are
/// answered with 400. Everything after the upload is answered with 200 and
/// one of the [`AnalyzeResponse`] shapes, so clients only have to branch on
/// the body.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => return reject_upload(rejection.body_text()),
    };
    let fields = match upload::parse_multipart(multipart).await {
        Ok(fields) => fields,
        Err(e) => return reject_upload(e),
    };

    let filename = fields.file.filename;
    let data = fields.file.data;
    let password = fields.password;

    // PDF decoding is CPU-bound and goes through MuPDF's blocking API
    let worker_state = state.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        summarize_statement(&worker_state, &data, password.as_deref())
    })
    .await;

    let response = match outcome {
        Ok(Ok((pages, summary))) => {
            let assessment = Assessment::new(summary.total, state.threshold);
            tracing::info!(
                filename = %filename,
                pages,
                tables = summary.tables_with_credit_column,
                parsed = summary.parsed_cells,
                skipped = summary.skipped_cells,
                total = summary.total,
                creditworthy = assessment.is_creditworthy,
                "statement analyzed"
            );
            AnalyzeResponse::success(filename, &assessment)
        }
        Ok(Err(e)) if e.is_password_error() => {
            tracing::info!(filename = %filename, error = %e, "statement needs a password");
            AnalyzeResponse::password_required()
        }
        Ok(Err(e)) => {
            tracing::warn!(filename = %filename, error = %e, "statement analysis failed");
            AnalyzeResponse::error(e.to_string())
        }
        Err(e) => {
            tracing::error!(filename = %filename, error = %e, "analysis task failed");
            AnalyzeResponse::error(format!("Analysis task failed: {}", e))
        }
    };

    Json(response).into_response()
}

fn reject_upload(error: String) -> Response {
    tracing::info!(error = %error, "rejected upload");
    (StatusCode::BAD_REQUEST, Json(AnalyzeResponse::error(error))).into_response()
}

fn summarize_statement(
    state: &AppState,
    data: &[u8],
    password: Option<&str>,
) -> Result<(usize, CreditSummary), BackendError> {
    let pages = state.backend.extract_tables(data, password)?;
    Ok((pages.len(), state.extractor.summarize_pages(&pages)))
}
