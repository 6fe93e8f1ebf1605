use analysis::AnalysisError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Every analysis failure already carries its single human-readable message;
/// this mapping only chooses the status code and wraps the message in the
/// standard `{"error": ...}` body.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Analysis(err) => {
                let status = match &err {
                    AnalysisError::MissingTicker
                    | AnalysisError::InvalidDateFormat(_)
                    | AnalysisError::DateRangeInverted { .. }
                    | AnalysisError::FutureDate => StatusCode::UNPROCESSABLE_ENTITY,
                    AnalysisError::NoDataFound(_) => StatusCode::NOT_FOUND,
                    AnalysisError::Provider(provider_err) => {
                        tracing::error!(error = ?provider_err, "Provider error.");
                        StatusCode::BAD_GATEWAY
                    }
                    AnalysisError::Export(export_err) => {
                        tracing::error!(error = ?export_err, "Export error.");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.to_string())
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
