//! Shared application state

use std::sync::Arc;

use call_audit_config::Settings;
use call_audit_pipeline::CallProcessor;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::jobs::JobManager;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Application settings
    pub settings: Arc<Settings>,
    /// Job table
    pub jobs: Arc<JobManager>,
    /// Pipeline processor
    pub processor: Arc<CallProcessor>,
    /// Prometheus handle for /metrics
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state from settings and a processor
    pub fn new(settings: Settings, processor: CallProcessor) -> Self {
        let jobs = Arc::new(JobManager::new(&settings.jobs));
        Self {
            settings: Arc::new(settings),
            jobs,
            processor: Arc::new(processor),
            metrics: None,
        }
    }

    /// Attach the Prometheus recorder handle
    pub fn with_metrics(mut self, metrics: PrometheusHandle) -> Self {
        self.metrics = Some(metrics);
        self
    }
}
