//! HTTP Endpoints
//!
//! REST API for the call audit pipeline. Stage results stream back
//! over SSE, one JSON event per completed step.

use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use call_audit_pipeline::{ingest, CallProcessor, StageEvent, TaskSelection};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::jobs::{Job, JobStatus};
use crate::metrics::metrics_handler;
use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );
    let max_upload = state.settings.server.max_upload_bytes;

    Router::new()
        // Call endpoints
        .route("/api/calls", post(upload_call).get(list_jobs))
        .route("/api/calls/:id", get(get_job).delete(delete_job))
        .route("/api/calls/:id/events", get(job_events))

        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))

        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))

        // Middleware
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000 for safety
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    // Credentials rule out wildcard headers, so list what the UIs send.
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Accept a call upload and start processing
///
/// Multipart fields: `file` (WAV audio) and optional `tasks` (JSON
/// array of task names; every task when absent). Responds with the
/// job id; results stream from `/api/calls/:id/events`.
async fn upload_call(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<serde_json::Value>), StatusCode> {
    let mut audio: Option<axum::body::Bytes> = None;
    let mut file_name = "upload.wav".to_string();
    let mut tasks = TaskSelection::all();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("file") => {
                if let Some(name) = field.file_name() {
                    file_name = sanitize_file_name(name);
                }
                audio = Some(field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?);
            }
            Some("tasks") => {
                let raw = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
                tasks = serde_json::from_str(&raw).map_err(|e| {
                    tracing::warn!(error = %e, "Rejected malformed task list");
                    StatusCode::BAD_REQUEST
                })?;
            }
            _ => {}
        }
    }

    let audio = audio.ok_or(StatusCode::BAD_REQUEST)?;
    if audio.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let (job, events) = state
        .jobs
        .create()
        .map_err(|_| StatusCode::TOO_MANY_REQUESTS)?;

    let temp_path = std::env::temp_dir().join(format!("call_audit_{}_{}", job.id, file_name));
    tokio::fs::write(&temp_path, &audio).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to persist upload");
        state.jobs.remove(&job.id);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    metrics::counter!("call_audit_uploads_total").increment(1);
    tracing::info!(
        job_id = %job.id,
        bytes = audio.len(),
        tasks = tasks.len(),
        "Accepted call upload"
    );

    let processor = state.processor.clone();
    let target_rate = state.settings.models.target_sample_rate;
    let worker_job = job.clone();
    tokio::spawn(async move {
        run_job(processor, worker_job, events, temp_path, target_rate, tasks).await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "job_id": job.id,
            "status": job.status(),
        })),
    ))
}

/// Drive the pipeline for one job, forwarding events into its channel
async fn run_job(
    processor: Arc<CallProcessor>,
    job: Arc<Job>,
    events: mpsc::Sender<StageEvent>,
    path: PathBuf,
    target_rate: u32,
    tasks: TaskSelection,
) {
    job.set_status(JobStatus::Running);

    let decode_path = path.clone();
    let decoded =
        tokio::task::spawn_blocking(move || ingest(&decode_path, target_rate)).await;

    match decoded {
        Ok(Ok(recording)) => {
            let stream = processor.stream(&recording, &tasks);
            tokio::pin!(stream);
            while let Some(event) = stream.next().await {
                job.touch();
                if let StageEvent::Complete(report) = &event {
                    job.set_report((**report).clone());
                    job.set_status(JobStatus::Completed);
                }
                if events.send(event).await.is_err() {
                    tracing::debug!(job_id = %job.id, "Event subscriber went away");
                }
            }
        }
        Ok(Err(e)) => {
            tracing::error!(job_id = %job.id, error = %e, "Failed to ingest upload");
            let _ = events
                .send(StageEvent::Error {
                    stage: "ingest".to_string(),
                    message: e.to_string(),
                })
                .await;
            job.set_status(JobStatus::Failed);
        }
        Err(e) => {
            tracing::error!(job_id = %job.id, error = %e, "Ingest task panicked");
            job.set_status(JobStatus::Failed);
        }
    }

    if tokio::fs::remove_file(&path).await.is_err() {
        tracing::warn!(path = %path.display(), "Failed to remove temp upload");
    }
}

/// Stream a job's stage events over SSE
///
/// The event channel has a single consumer; a second subscriber gets
/// 409 Conflict.
async fn job_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let job = state.jobs.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    job.touch();
    let rx = job.take_events().ok_or(StatusCode::CONFLICT)?;

    let stream = ReceiverStream::new(rx).map(|event| {
        Ok::<_, Infallible>(match Event::default().json_data(&event) {
            Ok(sse) => sse,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode stage event");
                Event::default().data(r#"{"step":"error","result":"event encoding failed"}"#)
            }
        })
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Job status (with the report once completed)
async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let job = state.jobs.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    let mut body = serde_json::json!({
        "job_id": job.id,
        "status": job.status(),
    });
    if let Some(report) = job.report() {
        body["report"] =
            serde_json::to_value(&report).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    }

    Ok(Json(body))
}

/// Drop a job
async fn delete_job(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.jobs.remove(&id);
    StatusCode::NO_CONTENT
}

/// List jobs
async fn list_jobs(State(state): State<AppState>) -> Json<serde_json::Value> {
    let jobs = state.jobs.list();
    Json(serde_json::json!({
        "jobs": jobs,
        "count": jobs.len(),
    }))
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ready",
        "jobs": state.jobs.count(),
    }))
}

/// Uploaded names end up in temp paths, so keep only safe characters
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload.wav".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_audit_config::{AnalysisRules, Settings};

    #[test]
    fn test_router_creation() {
        let settings = Settings::default();
        let processor =
            CallProcessor::with_http_backends(&settings, &AnalysisRules::default()).unwrap();
        let state = AppState::new(settings, processor);
        let _ = create_router(state);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("call one.wav"), "call_one.wav");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name(""), "upload.wav");
    }
}
