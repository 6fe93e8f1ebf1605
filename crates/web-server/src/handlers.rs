use crate::{AppState, error::AppError};
use analysis::{AnalysisReport, AnalysisRequest};
use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The body of an analyze request: the pipeline inputs plus an `export`
/// switch that also writes the CSV snapshot.
#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    #[serde(flatten)]
    pub request: AnalysisRequest,
    #[serde(default)]
    pub export: bool,
}

/// Where an analyze response's CSV snapshot can be picked up.
#[derive(Debug, Serialize)]
pub struct ExportInfo {
    pub file_name: String,
    pub download_path: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub report: AnalysisReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportInfo>,
}

/// # POST /api/analyze
/// Runs the full pipeline for one ticker and date range and returns the
/// complete report. With `"export": true` the CSV snapshot is written as
/// well and its download location included in the response.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(params): Json<AnalyzeParams>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    tracing::info!("Received analyze request for '{}'", params.request.ticker);

    let report = state.service.run(&params.request).await?;

    let export = if params.export {
        let path = state.service.export_snapshot(&report)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        Some(ExportInfo {
            download_path: format!("/api/exports/{file_name}"),
            file_name,
        })
    } else {
        None
    };

    Ok(Json(AnalyzeResponse { report, export }))
}

/// # GET /api/exports/:file_name
/// Serves a previously written CSV snapshot as a download.
pub async fn download_export(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !is_safe_export_name(&file_name) {
        return Err(AppError::NotFound(format!(
            "No export named '{file_name}'"
        )));
    }

    let path = state.service.export_dir().join(&file_name);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::NotFound(format!("No export named '{file_name}'")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    ))
}

/// Snapshots live in one flat directory; anything that could walk out of it
/// is not a snapshot name.
fn is_safe_export_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
        && name.ends_with(".csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_plain_csv_names_are_served() {
        assert!(is_safe_export_name(
            "AAPL_analysis_2024-01-02_to_2024-06-28.csv"
        ));
        assert!(is_safe_export_name("_GSPC_analysis_x_to_y.csv"));

        assert!(!is_safe_export_name(""));
        assert!(!is_safe_export_name("../secrets.csv"));
        assert!(!is_safe_export_name("notes.txt"));
        assert!(!is_safe_export_name("a/b.csv"));
        assert!(!is_safe_export_name("a\\b.csv"));
    }
}
