use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::app_state::AppState;
use crate::models::comparison::{CompareRequest, ComparisonResult};
use crate::services::plagiarism;

/// POST /api/v1/compare — plagiarism scores of a submission against a folder.
pub async fn compare(
    State(state): State<AppState>,
    Json(request): Json<CompareRequest>,
) -> Result<Json<Vec<ComparisonResult>>, (StatusCode, String)> {
    let results = plagiarism::compare_against_folder(
        &state.compare_root,
        &request.file_path,
        &request.folder_path,
    )
    .await
    .map_err(|e| {
        tracing::warn!(
            file = %request.file_path.display(),
            folder = %request.folder_path.display(),
            error = %e,
            "Comparison rejected"
        );
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    metrics::counter!("submission_comparisons_total").increment(1);
    Ok(Json(results))
}
