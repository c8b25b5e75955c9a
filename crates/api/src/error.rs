//! Conversion of domain errors into JSON responses.
//!
//! Bodies have the shape `{"error": {"code": "...", "message": "..."}}`.
//! The code is the domain's own (`PERIOD_LOCKED`, `UNBALANCED`), the status
//! comes from the matching [`AppError`] variant.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use folio_core::ledger::{ErrorCategory, LedgerError};
use folio_core::reports::ReportError;
use folio_shared::AppError;
use serde_json::json;
use tracing::{error, warn};

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    code: &'static str,
}

impl ApiError {
    /// Wraps an application error under a specific code.
    #[must_use]
    pub fn new(error: AppError, code: &'static str) -> Self {
        Self { error, code }
    }

    /// Error code rendered in the body.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// HTTP status of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        let code = error.error_code();
        Self { error, code }
    }
}

fn classify(status: u16, category: ErrorCategory, message: String) -> AppError {
    match (status, category) {
        (404, _) => AppError::NotFound(message),
        (_, ErrorCategory::Validation) => AppError::Validation(message),
        (_, ErrorCategory::State) => AppError::Conflict(message),
        (_, ErrorCategory::Resolution) => AppError::BusinessRule(message),
        (_, ErrorCategory::Consistency) => AppError::Consistency(message),
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let code = err.error_code();
        let error = match &err {
            LedgerError::Persistence(message) => AppError::Database(message.clone()),
            _ => classify(err.http_status_code(), err.category(), err.to_string()),
        };
        Self { error, code }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        if let ReportError::Ledger(inner) = err {
            return inner.into();
        }
        let code = err.error_code();
        let error = classify(err.http_status_code(), err.category(), err.to_string());
        Self { error, code }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self.error {
            AppError::Consistency(message) => {
                error!(code = self.code, %message, "ledger consistency check failed");
            }
            AppError::Database(message) | AppError::Internal(message) => {
                error!(code = self.code, %message, "request failed");
            }
            other => warn!(code = self.code, message = %other, "request rejected"),
        }
        let message = match &self.error {
            AppError::NotFound(m)
            | AppError::Validation(m)
            | AppError::BusinessRule(m)
            | AppError::Conflict(m)
            | AppError::Consistency(m) => m.clone(),
            AppError::Database(_) | AppError::Internal(_) => "An error occurred".to_string(),
        };
        (
            status,
            Json(json!({
                "error": {
                    "code": self.code,
                    "message": message
                }
            })),
        )
            .into_response()
    }
}
