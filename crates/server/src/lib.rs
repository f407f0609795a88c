//! Call Audit Server
//!
//! HTTP endpoints for uploading call recordings and streaming the
//! pipeline's stage results.

pub mod http;
pub mod jobs;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use jobs::{Job, JobManager, JobStatus};
pub use metrics::{init_metrics, metrics_handler};
pub use state::AppState;

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Job error: {0}")]
    Job(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for axum::http::StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Job(_) => axum::http::StatusCode::NOT_FOUND,
            ServerError::InvalidRequest(_) => axum::http::StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
