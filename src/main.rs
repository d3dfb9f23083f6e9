use axum::{routing::get, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use submission_grader::{app_state::AppState, config::AppConfig, db, routes};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing submission intake API");

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!(
        "submission_received_total",
        "Total submissions accepted for evaluation"
    );
    metrics::describe_counter!(
        "submission_comparisons_total",
        "Plagiarism comparisons served"
    );

    tracing::info!("Connecting to PostgreSQL database");
    let db_pool = db::init_pool(&config.database_url, config.api_max_connections)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Running database migrations");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let state = AppState::new(db_pool, config.compare_root());

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/api/v1/submissions",
            post(routes::submissions::submit).get(routes::submissions::list_submissions),
        )
        .route(
            "/api/v1/submissions/{id}",
            get(routes::submissions::get_submission),
        )
        .route("/api/v1/compare", post(routes::compare::compare))
        .with_state(state)
        .route(
            "/metrics",
            get(routes::metrics::render_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(5 * 1024 * 1024)); // notebooks can be large

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
