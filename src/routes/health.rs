use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::time::Instant;

use crate::app_state::AppState;
use crate::db::queries;
use crate::models::submission::StatusCounts;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
    /// Submissions the worker has yet to resolve; absent when the store is down.
    pub pending_submissions: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub reachable: bool,
    pub latency_ms: Option<u64>,
}

impl HealthResponse {
    fn from_store(counts: Option<(StatusCounts, u64)>) -> (StatusCode, Self) {
        let (database, pending_submissions) = match counts {
            Some((counts, latency_ms)) => (
                DatabaseHealth {
                    reachable: true,
                    latency_ms: Some(latency_ms),
                },
                Some(counts.pending),
            ),
            None => (
                DatabaseHealth {
                    reachable: false,
                    latency_ms: None,
                },
                None,
            ),
        };

        let (code, status) = if database.reachable {
            (StatusCode::OK, "ok")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        };

        (
            code,
            Self {
                status,
                version: env!("CARGO_PKG_VERSION"),
                database,
                pending_submissions,
            },
        )
    }
}

/// GET /health — job store reachability and queue depth.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = Instant::now();

    let counts = match queries::count_by_status(&state.db).await {
        Ok(counts) => Some((
            StatusCounts::from_counts(&counts),
            start.elapsed().as_millis() as u64,
        )),
        Err(e) => {
            tracing::warn!(error = %e, "Job store health check failed");
            None
        }
    };

    let (code, response) = HealthResponse::from_store(counts);
    (code, Json(response))
}
