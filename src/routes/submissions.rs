use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::queries;
use crate::models::submission::{
    ListQuery, StatusCounts, SubmissionListResponse, SubmissionStatusResponse, SubmitRequest,
    SubmitResponse,
};

/// POST /api/v1/submissions — enqueue a submission for evaluation.
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), (StatusCode, String)> {
    request
        .validate()
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let enqueued_at = request.enqueued_at_or_now();
    let job = queries::create_submission(
        &state.db,
        request.submitter_name.trim(),
        &request.payload,
        &enqueued_at,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to create submission");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to store submission".to_string(),
        )
    })?;

    metrics::counter!("submission_received_total").increment(1);
    tracing::info!(
        job_id = %job.id,
        submitter = %job.submitter_name,
        enqueued_at = %job.enqueued_at,
        "Submission enqueued"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            id: job.id,
            status: job.status,
            message: "Submission queued for evaluation".to_string(),
        }),
    ))
}

/// GET /api/v1/submissions/{id} — current status and score of a submission.
pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionStatusResponse>, StatusCode> {
    let job = queries::get_submission(&state.db, id)
        .await
        .map_err(|e| {
            tracing::error!(job_id = %id, error = %e, "Failed to load submission");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(job.into()))
}

/// GET /api/v1/submissions?status=&limit= — newest submissions plus totals per status.
pub async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<SubmissionListResponse>, StatusCode> {
    let jobs = queries::list_submissions(&state.db, query.status, query.limit())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list submissions");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let counts = queries::count_by_status(&state.db).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count submissions");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(SubmissionListResponse {
        counts: StatusCounts::from_counts(&counts),
        submissions: jobs.into_iter().map(Into::into).collect(),
    }))
}
