use std::sync::Arc;
use submission_grader::{
    config::{AppConfig, WORKER_MAX_CONNECTIONS},
    db::{self, queries},
    models::job::{JobStatus, Verdict},
    services::{
        evaluator::ProcessEvaluator,
        scheduler::Scheduler,
        store::{JobStore, PgJobStore},
    },
};

/// Integration test: Postgres job store
///
/// Verifies against a real database:
/// 1. Migrations and schema
/// 2. Submission creation and lookup
/// 3. Pending listing and status counts
/// 4. Single terminal write per submission
///
/// Note: This requires a running PostgreSQL instance configured via
/// environment variables (DATABASE_URL, EVALUATOR_COMMAND).
#[tokio::test]
#[ignore] // Run with: cargo test --test integration_test -- --ignored
async fn test_pg_job_store_lifecycle() {
    let config = AppConfig::from_env().expect("Failed to load config");

    let db_pool = db::init_pool(&config.database_url, WORKER_MAX_CONNECTIONS)
        .await
        .expect("Failed to connect to database");

    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run migrations");

    let job = queries::create_submission(&db_pool, "integration-test", "{}", "01-01-2024 10:00")
        .await
        .expect("Failed to create submission");

    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.score, 0.0);

    let fetched = queries::get_submission(&db_pool, job.id)
        .await
        .expect("Failed to get submission")
        .expect("Submission not found");
    assert_eq!(fetched, job);

    let listed = queries::list_submissions(&db_pool, Some(JobStatus::Pending), 500)
        .await
        .expect("Failed to list submissions");
    assert!(listed.iter().all(|j| j.status == JobStatus::Pending));

    let counts = queries::count_by_status(&db_pool)
        .await
        .expect("Failed to count submissions");
    assert!(counts
        .iter()
        .any(|&(status, total)| status == JobStatus::Pending && total >= 1));

    let store = PgJobStore::new(db_pool.clone());
    let pending = store.list_pending().await.expect("Failed to list pending");
    assert!(pending.iter().any(|j| j.id == job.id));

    let verdict = Verdict {
        status: JobStatus::Success,
        score: 87.5,
    };
    assert!(store.record_verdict(job.id, &verdict).await.unwrap());

    // Second terminal write is refused
    assert!(!store
        .record_verdict(job.id, &Verdict::pipeline_failure())
        .await
        .unwrap());

    let resolved = queries::get_submission(&db_pool, job.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.status, JobStatus::Success);
    assert_eq!(resolved.score, 87.5);

    let pending = store.list_pending().await.unwrap();
    assert!(pending.iter().all(|j| j.id != job.id));

    sqlx::query("DELETE FROM submissions WHERE id = $1")
        .bind(job.id)
        .execute(&db_pool)
        .await
        .expect("Failed to clean up");

    println!("✓ Postgres job store lifecycle passed");
}

/// Runs one real pass with the configured evaluator against the database.
#[tokio::test]
#[ignore] // Requires PostgreSQL and a working EVALUATOR_COMMAND
async fn test_pass_with_configured_evaluator() {
    let config = AppConfig::from_env().expect("Failed to load config");
    let db_pool = db::init_pool(&config.database_url, WORKER_MAX_CONNECTIONS)
        .await
        .expect("Failed to connect to database");
    db::run_migrations(&db_pool).await.expect("Failed to run migrations");

    let job = queries::create_submission(&db_pool, "integration-pass", "{}", "01-01-2024 10:00")
        .await
        .expect("Failed to create submission");

    let scheduler = Scheduler::new(
        Arc::new(PgJobStore::new(db_pool.clone())),
        Arc::new(ProcessEvaluator::new(config.evaluator())),
    );
    let summary = scheduler.run_pass().await.expect("Pass failed");
    assert!(summary.listed >= 1);

    let resolved = queries::get_submission(&db_pool, job.id)
        .await
        .unwrap()
        .unwrap();
    assert!(resolved.status.is_terminal());

    println!(
        "✓ Pass resolved submission: {} ({})",
        resolved.status, resolved.score
    );
}
