//! Prometheus metrics endpoint

use axum::extract::State;

use crate::state::AppState;

/// Install the Prometheus recorder
///
/// Returns `None` when a global recorder is already installed (e.g.
/// in tests running several servers in one process).
pub fn init_metrics() -> Option<metrics_exporter_prometheus::PrometheusHandle> {
    match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus recorder not installed");
            None
        }
    }
}

/// Render current metrics in Prometheus text format
pub async fn metrics_handler(State(state): State<AppState>) -> String {
    match &state.metrics {
        Some(handle) => handle.render(),
        None => String::new(),
    }
}
