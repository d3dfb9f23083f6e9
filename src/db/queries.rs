use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::job::{Job, JobStatus, Verdict};

/// Insert a new pending submission
pub async fn create_submission(
    pool: &PgPool,
    submitter_name: &str,
    payload: &str,
    enqueued_at: &str,
) -> Result<Job, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO submissions (submitter_name, payload, enqueued_at, status)
        VALUES ($1, $2, $3, 'Pending')
        RETURNING id, submitter_name, payload, enqueued_at, status, score
        "#,
    )
    .bind(submitter_name)
    .bind(payload)
    .bind(enqueued_at)
    .fetch_one(pool)
    .await?;

    job_from_row(&row)
}

/// Get a submission by ID
pub async fn get_submission(pool: &PgPool, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, submitter_name, payload, enqueued_at, status, score
        FROM submissions
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(job_from_row).transpose()
}

/// Snapshot of every submission still awaiting evaluation
pub async fn list_pending_submissions(pool: &PgPool) -> Result<Vec<Job>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, submitter_name, payload, enqueued_at, status, score
        FROM submissions
        WHERE status = 'Pending'
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(job_from_row).collect()
}

/// Submissions newest first, optionally restricted to one status
pub async fn list_submissions(
    pool: &PgPool,
    status: Option<JobStatus>,
    limit: i64,
) -> Result<Vec<Job>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, submitter_name, payload, enqueued_at, status, score
        FROM submissions
        WHERE $1::TEXT IS NULL OR status = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(status.map(|s| s.to_string()))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(job_from_row).collect()
}

/// Number of submissions per status
pub async fn count_by_status(pool: &PgPool) -> Result<Vec<(JobStatus, i64)>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT status, COUNT(*) AS total
        FROM submissions
        GROUP BY status
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| Ok((status_from_row(row)?, row.try_get("total")?)))
        .collect()
}

/// Write a terminal verdict. Only a row that is still pending transitions;
/// returns whether it did.
pub async fn record_verdict(
    pool: &PgPool,
    id: Uuid,
    verdict: &Verdict,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE submissions
        SET status = $1,
            score = $2,
            updated_at = NOW()
        WHERE id = $3 AND status = 'Pending'
        "#,
    )
    .bind(verdict.status.to_string())
    .bind(verdict.score)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

fn status_from_row(row: &PgRow) -> Result<JobStatus, sqlx::Error> {
    let status_str: String = row.try_get("status")?;
    JobStatus::from_str(&status_str).map_err(|e| sqlx::Error::ColumnDecode {
        index: "status".to_string(),
        source: Box::new(e),
    })
}

fn job_from_row(row: &PgRow) -> Result<Job, sqlx::Error> {
    Ok(Job {
        id: row.try_get("id")?,
        submitter_name: row.try_get("submitter_name")?,
        payload: row.try_get("payload")?,
        enqueued_at: row.try_get("enqueued_at")?,
        status: status_from_row(row)?,
        score: row.try_get("score")?,
    })
}
