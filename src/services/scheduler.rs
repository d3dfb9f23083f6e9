use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::models::job::{order_by_enqueue_time, Job, JobStatus, Verdict};
use crate::services::evaluator::{Evaluator, LaunchError};
use crate::services::result_parser::{self, ParseError};
use crate::services::store::{JobStore, StoreError};
use crate::services::verdict::VerdictPolicy;

/// Default delay between two passes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Errors local to one job. These never abort a pass; the job resolves as a failure.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl PipelineError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Launch(_) => "launch",
            PipelineError::Parse(_) => "parse",
        }
    }
}

/// Counters for a single pass over the pending set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub listed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub pipeline_errors: usize,
    pub write_failures: usize,
    pub skipped: usize,
}

/// The dequeue loop: polls pending jobs, evaluates them in enqueue order and
/// writes each verdict back.
pub struct Scheduler {
    store: Arc<dyn JobStore>,
    evaluator: Arc<dyn Evaluator>,
    policy: VerdictPolicy,
    poll_interval: Duration,
}

impl Scheduler {
    pub fn new(store: Arc<dyn JobStore>, evaluator: Arc<dyn Evaluator>) -> Self {
        Self {
            store,
            evaluator,
            policy: VerdictPolicy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_policy(mut self, policy: VerdictPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run passes until `shutdown` resolves. Shutdown is only observed between
    /// passes, so an in-flight job is never cut short by it.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            match self.run_pass().await {
                Ok(summary) if summary.listed > 0 => {
                    tracing::info!(
                        listed = summary.listed,
                        succeeded = summary.succeeded,
                        failed = summary.failed,
                        pipeline_errors = summary.pipeline_errors,
                        write_failures = summary.write_failures,
                        skipped = summary.skipped,
                        "Pass complete"
                    );
                }
                Ok(_) => {
                    tracing::trace!("No pending submissions, sleeping");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to list pending submissions, will retry");
                }
            }

            tokio::select! {
                _ = sleep(self.poll_interval) => {}
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, stopping dequeue loop");
                    break;
                }
            }
        }
    }

    /// One pass over the current pending snapshot.
    ///
    /// Only the initial query can fail the pass. A write-back failure leaves the
    /// job pending for a later pass.
    pub async fn run_pass(&self) -> Result<PassSummary, StoreError> {
        metrics::counter!("submission_passes_total").increment(1);

        let mut pending = self.store.list_pending().await.inspect_err(|_| {
            metrics::counter!("submission_store_errors_total", "operation" => "list").increment(1);
        })?;
        order_by_enqueue_time(&mut pending);

        metrics::gauge!("submission_pending_jobs").set(pending.len() as f64);

        let mut summary = PassSummary {
            listed: pending.len(),
            ..PassSummary::default()
        };

        for job in &pending {
            let verdict = match self.evaluate_job(job).await {
                Ok(verdict) => verdict,
                Err(e) => {
                    tracing::error!(
                        job_id = %job.id,
                        submitter = %job.submitter_name,
                        error_kind = e.kind(),
                        error = %e,
                        "Evaluation failed, resolving as failure"
                    );
                    metrics::counter!("submission_pipeline_errors_total", "kind" => e.kind())
                        .increment(1);
                    summary.pipeline_errors += 1;
                    Verdict::pipeline_failure()
                }
            };

            match self.store.record_verdict(job.id, &verdict).await {
                Ok(true) => {
                    metrics::counter!(
                        "submission_evaluations_total",
                        "status" => verdict.status.to_string()
                    )
                    .increment(1);
                    match verdict.status {
                        JobStatus::Success => summary.succeeded += 1,
                        _ => summary.failed += 1,
                    }
                    tracing::info!(
                        job_id = %job.id,
                        submitter = %job.submitter_name,
                        status = %verdict.status,
                        score = verdict.score,
                        "Processed submission"
                    );
                }
                Ok(false) => {
                    summary.skipped += 1;
                    tracing::warn!(
                        job_id = %job.id,
                        "Submission already resolved, verdict not written"
                    );
                }
                Err(e) => {
                    summary.write_failures += 1;
                    metrics::counter!("submission_store_errors_total", "operation" => "write")
                        .increment(1);
                    tracing::error!(
                        job_id = %job.id,
                        error = %e,
                        "Failed to record verdict, submission stays pending"
                    );
                }
            }
        }

        Ok(summary)
    }

    /// Evaluator → result parser → verdict policy for one job.
    pub async fn evaluate_job(&self, job: &Job) -> Result<Verdict, PipelineError> {
        let start = Instant::now();
        let output = self.evaluator.evaluate(job).await;
        metrics::histogram!("submission_evaluation_seconds").record(start.elapsed().as_secs_f64());

        let score = result_parser::parse_score(&output?)?;
        Ok(self.policy.decide(score))
    }
}
