use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use submission_grader::{
    config::{AppConfig, WORKER_MAX_CONNECTIONS},
    db,
    shutdown::install_shutdown_handler,
    services::{
        evaluator::ProcessEvaluator, scheduler::Scheduler, store::PgJobStore,
        verdict::VerdictPolicy,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting submission evaluation worker");

    let config = AppConfig::from_env().expect("Failed to load configuration");

    if let Some(addr) = &config.worker_metrics_addr {
        let addr: SocketAddr = addr.parse().expect("Invalid WORKER_METRICS_ADDR");
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .expect("Failed to install Prometheus exporter");
        tracing::info!(%addr, "Worker metrics listener started");
    }

    metrics::describe_counter!("submission_passes_total", "Dequeue passes started");
    metrics::describe_gauge!(
        "submission_pending_jobs",
        "Pending submissions seen by the latest pass"
    );
    metrics::describe_counter!(
        "submission_evaluations_total",
        "Submissions resolved, by terminal status"
    );
    metrics::describe_counter!(
        "submission_pipeline_errors_total",
        "Evaluations that failed in the pipeline, by error kind"
    );
    metrics::describe_counter!(
        "submission_store_errors_total",
        "Job store failures, by operation"
    );
    metrics::describe_histogram!(
        "submission_evaluation_seconds",
        "Wall-clock time of one evaluator run"
    );

    tracing::info!("Connecting to PostgreSQL");
    let db_pool = db::init_pool(&config.database_url, WORKER_MAX_CONNECTIONS)
        .await
        .expect("Failed to connect to database");

    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let shutdown = install_shutdown_handler().expect("Failed to install shutdown handler");

    let evaluator_config = config.evaluator();
    tracing::info!(
        command = %evaluator_config.command,
        timeout_secs = evaluator_config.timeout.as_secs(),
        input_dir = %evaluator_config.input_dir.display(),
        threshold = config.pass_threshold,
        "Worker ready, starting dequeue loop"
    );

    let scheduler = Scheduler::new(
        Arc::new(PgJobStore::new(db_pool)),
        Arc::new(ProcessEvaluator::new(evaluator_config)),
    )
    .with_policy(VerdictPolicy::new(config.pass_threshold))
    .with_poll_interval(config.poll_interval());

    scheduler
        .run(async {
            let _ = shutdown.await;
        })
        .await;

    tracing::info!("Worker stopped");
}
