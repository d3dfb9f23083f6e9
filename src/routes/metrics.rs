use axum::extract::State;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// GET /metrics — intake and evaluation metrics in Prometheus text format.
pub async fn render_metrics(State(handle): State<Arc<PrometheusHandle>>) -> String {
    handle.render()
}
