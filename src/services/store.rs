use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Mutex;
use uuid::Uuid;

use crate::db::queries;
use crate::models::job::{Job, JobStatus, Verdict};

/// The subset of job-store capabilities the dequeue loop depends on.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// All jobs whose status is `Pending`, in no particular order.
    async fn list_pending(&self) -> Result<Vec<Job>, StoreError>;

    /// Transition a pending job to its verdict. Returns `false` if the job was
    /// no longer pending (already resolved or gone).
    async fn record_verdict(&self, id: Uuid, verdict: &Verdict) -> Result<bool, StoreError>;
}

/// PostgreSQL-backed job store.
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn list_pending(&self) -> Result<Vec<Job>, StoreError> {
        Ok(queries::list_pending_submissions(&self.pool).await?)
    }

    async fn record_verdict(&self, id: Uuid, verdict: &Verdict) -> Result<bool, StoreError> {
        Ok(queries::record_verdict(&self.pool, id, verdict).await?)
    }
}

/// In-process job store, used by tests and local runs without a database.
#[derive(Default)]
pub struct MemoryJobStore {
    inner: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    jobs: Vec<Job>,
    terminal_writes: Vec<(Uuid, Verdict)>,
    fail_next_list: bool,
    fail_writes_for: Vec<Uuid>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pending job, returning its id.
    pub fn submit(&self, submitter_name: &str, payload: &str, enqueued_at: &str) -> Uuid {
        let job = Job {
            id: Uuid::new_v4(),
            submitter_name: submitter_name.to_string(),
            payload: payload.to_string(),
            enqueued_at: enqueued_at.to_string(),
            status: JobStatus::Pending,
            score: 0.0,
        };
        let id = job.id;
        self.lock().jobs.push(job);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<Job> {
        self.lock().jobs.iter().find(|j| j.id == id).cloned()
    }

    /// Every successful terminal write, in the order it happened.
    pub fn terminal_writes(&self) -> Vec<(Uuid, Verdict)> {
        self.lock().terminal_writes.clone()
    }

    /// Make the next `list_pending` call fail.
    pub fn fail_next_list(&self) {
        self.lock().fail_next_list = true;
    }

    /// Make the next write-back for `id` fail.
    pub fn fail_next_write(&self, id: Uuid) {
        self.lock().fail_writes_for.push(id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a test thread panicked mid-update.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn list_pending(&self) -> Result<Vec<Job>, StoreError> {
        let mut state = self.lock();
        if std::mem::take(&mut state.fail_next_list) {
            return Err(StoreError::Unavailable("injected query failure".to_string()));
        }
        Ok(state
            .jobs
            .iter()
            .filter(|j| j.status == JobStatus::Pending)
            .cloned()
            .collect())
    }

    async fn record_verdict(&self, id: Uuid, verdict: &Verdict) -> Result<bool, StoreError> {
        let mut state = self.lock();
        if let Some(pos) = state.fail_writes_for.iter().position(|f| *f == id) {
            state.fail_writes_for.remove(pos);
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }

        let Some(job) = state
            .jobs
            .iter_mut()
            .find(|j| j.id == id && j.status == JobStatus::Pending)
        else {
            return Ok(false);
        };

        job.status = verdict.status;
        job.score = verdict.score;
        state.terminal_writes.push((id, *verdict));
        Ok(true)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Job store unavailable: {0}")]
    Unavailable(String),
}
