use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Textual format of `enqueued_at`: day-month-year hour:minute.
pub const ENQUEUED_AT_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Lifecycle status of a submission. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
pub enum JobStatus {
    Pending,
    Success,
    Failure,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

/// A submission awaiting (or having received) an evaluation verdict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: Uuid,
    pub submitter_name: String,
    pub payload: String,
    pub enqueued_at: String,
    pub status: JobStatus,
    pub score: f64,
}

impl Job {
    /// Parsed enqueue time, or `None` when the caller-supplied text is malformed.
    pub fn enqueued_time(&self) -> Option<NaiveDateTime> {
        parse_enqueued_at(&self.enqueued_at)
    }
}

/// Terminal `{status, score}` pair written back to a job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    pub status: JobStatus,
    pub score: f64,
}

impl Verdict {
    /// Outcome for any pipeline error: the dashboard only ever sees `Failure` with score 0.
    pub fn pipeline_failure() -> Self {
        Self {
            status: JobStatus::Failure,
            score: 0.0,
        }
    }
}

pub fn parse_enqueued_at(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), ENQUEUED_AT_FORMAT).ok()
}

/// Sort a pending snapshot ascending by enqueue time.
///
/// Unparsable timestamps go after every parseable one. The sort is stable, so
/// ties (and malformed entries) keep the order the store returned them in.
pub fn order_by_enqueue_time(jobs: &mut [Job]) {
    jobs.sort_by_cached_key(|job| {
        let time = job.enqueued_time();
        (time.is_none(), time)
    });
}
