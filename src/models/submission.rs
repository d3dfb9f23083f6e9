use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::{parse_enqueued_at, Job, JobStatus, ENQUEUED_AT_FORMAT};

const MAX_NAME_CHARS: usize = 200;

/// Default and maximum page size of the submissions listing.
pub const MAX_LIST_LIMIT: i64 = 500;

/// Request to enqueue a submission for evaluation.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitRequest {
    /// Stored trimmed, so it is validated trimmed.
    #[garde(custom(validate_submitter_name))]
    pub submitter_name: String,

    #[garde(length(min = 1))]
    pub payload: String,

    /// `DD-MM-YYYY HH:MM`; stamped by the server when omitted.
    #[garde(custom(validate_enqueued_at))]
    pub enqueued_at: Option<String>,
}

fn validate_submitter_name(value: &String, _ctx: &()) -> garde::Result {
    let chars = value.trim().chars().count();
    if chars == 0 {
        Err(garde::Error::new("must not be blank"))
    } else if chars > MAX_NAME_CHARS {
        Err(garde::Error::new(format!(
            "must be at most {} characters",
            MAX_NAME_CHARS
        )))
    } else {
        Ok(())
    }
}

fn validate_enqueued_at(value: &Option<String>, _ctx: &()) -> garde::Result {
    match value {
        Some(text) if parse_enqueued_at(text).is_none() => Err(garde::Error::new(format!(
            "expected a timestamp formatted as {}",
            ENQUEUED_AT_FORMAT
        ))),
        _ => Ok(()),
    }
}

impl SubmitRequest {
    /// Enqueue time to store, falling back to the current UTC time.
    pub fn enqueued_at_or_now(&self) -> String {
        match &self.enqueued_at {
            Some(text) => text.trim().to_string(),
            None => chrono::Utc::now().format(ENQUEUED_AT_FORMAT).to_string(),
        }
    }
}

/// Response after enqueuing a submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: Uuid,
    pub status: JobStatus,
    pub message: String,
}

/// Response for querying a submission's status.
#[derive(Debug, Serialize)]
pub struct SubmissionStatusResponse {
    pub id: Uuid,
    pub submitter_name: String,
    pub enqueued_at: String,
    pub status: JobStatus,
    pub score: f64,
}

impl From<Job> for SubmissionStatusResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            submitter_name: job.submitter_name,
            enqueued_at: job.enqueued_at,
            status: job.status,
            score: job.score,
        }
    }
}

/// Query string of `GET /api/v1/submissions`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<JobStatus>,
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(MAX_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
    }
}

/// Totals across every submission, regardless of the listing filter.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: i64,
    pub pending: i64,
    pub successful: i64,
    pub failed: i64,
}

impl StatusCounts {
    pub fn from_counts(counts: &[(JobStatus, i64)]) -> Self {
        counts
            .iter()
            .fold(Self::default(), |mut acc, &(status, count)| {
                acc.total += count;
                match status {
                    JobStatus::Pending => acc.pending += count,
                    JobStatus::Success => acc.successful += count,
                    JobStatus::Failure => acc.failed += count,
                }
                acc
            })
    }
}

/// Response for listing submissions.
#[derive(Debug, Serialize)]
pub struct SubmissionListResponse {
    pub counts: StatusCounts,
    pub submissions: Vec<SubmissionStatusResponse>,
}
