//! Job tracking
//!
//! One job per uploaded call. The pipeline task pushes stage events
//! into the job's channel; the SSE endpoint drains it. Jobs are
//! capacity-bounded and expire after a configurable idle timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use call_audit_config::JobConfig;
use call_audit_core::CallReport;
use call_audit_pipeline::StageEvent;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::{mpsc, watch};

use crate::ServerError;

/// Event channel capacity; comfortably above the event count of one run
const EVENT_BUFFER: usize = 32;

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

/// One call being processed
pub struct Job {
    /// Job ID
    pub id: String,
    /// Creation time
    pub created_at: Instant,
    /// Last activity
    last_activity: RwLock<Instant>,
    /// Lifecycle state
    status: RwLock<JobStatus>,
    /// Final report once the pipeline completes
    report: RwLock<Option<CallReport>>,
    /// Event receiver, taken by the first SSE subscriber
    events: Mutex<Option<mpsc::Receiver<StageEvent>>>,
}

impl Job {
    fn new(id: impl Into<String>, events: mpsc::Receiver<StageEvent>) -> Self {
        Self {
            id: id.into(),
            created_at: Instant::now(),
            last_activity: RwLock::new(Instant::now()),
            status: RwLock::new(JobStatus::Queued),
            report: RwLock::new(None),
            events: Mutex::new(Some(events)),
        }
    }

    /// Update last activity
    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    /// Check if the job has been idle past the timeout
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.read().elapsed() > timeout
    }

    /// Current lifecycle state
    pub fn status(&self) -> JobStatus {
        *self.status.read()
    }

    /// Move the job to a new state
    pub fn set_status(&self, status: JobStatus) {
        *self.status.write() = status;
        self.touch();
    }

    /// Store the final report
    pub fn set_report(&self, report: CallReport) {
        *self.report.write() = Some(report);
    }

    /// Final report, when completed
    pub fn report(&self) -> Option<CallReport> {
        self.report.read().clone()
    }

    /// Take the event receiver; `None` once a subscriber claimed it
    pub fn take_events(&self) -> Option<mpsc::Receiver<StageEvent>> {
        self.events.lock().take()
    }
}

/// Tracks in-flight and finished jobs
pub struct JobManager {
    jobs: DashMap<String, Arc<Job>>,
    max_jobs: usize,
    job_timeout: Duration,
    cleanup_interval: Duration,
}

impl JobManager {
    /// Create a manager from configuration
    pub fn new(config: &JobConfig) -> Self {
        Self {
            jobs: DashMap::new(),
            max_jobs: config.max_jobs,
            job_timeout: Duration::from_secs(config.timeout_secs),
            cleanup_interval: Duration::from_secs(config.cleanup_interval_secs),
        }
    }

    /// Create a new job and its event sender
    pub fn create(&self) -> Result<(Arc<Job>, mpsc::Sender<StageEvent>), ServerError> {
        if self.jobs.len() >= self.max_jobs {
            self.cleanup_expired();
            if self.jobs.len() >= self.max_jobs {
                return Err(ServerError::Job("Max jobs reached".to_string()));
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let job = Arc::new(Job::new(&id, rx));
        self.jobs.insert(id.clone(), job.clone());

        tracing::info!(job_id = %id, "Created job");
        Ok((job, tx))
    }

    /// Get a job by ID
    pub fn get(&self, id: &str) -> Option<Arc<Job>> {
        self.jobs.get(id).map(|entry| entry.value().clone())
    }

    /// Remove a job
    pub fn remove(&self, id: &str) {
        if self.jobs.remove(id).is_some() {
            tracing::info!(job_id = %id, "Removed job");
        }
    }

    /// Current job count
    pub fn count(&self) -> usize {
        self.jobs.len()
    }

    /// List job IDs
    pub fn list(&self) -> Vec<String> {
        self.jobs.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Drop jobs idle past the timeout
    pub fn cleanup_expired(&self) {
        let expired: Vec<String> = self
            .jobs
            .iter()
            .filter(|entry| entry.value().is_expired(self.job_timeout))
            .map(|entry| entry.key().clone())
            .collect();

        for id in expired {
            self.jobs.remove(&id);
            tracing::info!(job_id = %id, "Expired job");
        }
    }

    /// Start a background task that periodically drops expired jobs.
    ///
    /// Returns a shutdown sender that stops the task.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let manager = Arc::clone(self);
        let interval = manager.cleanup_interval;

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        let before = manager.count();
                        manager.cleanup_expired();
                        let after = manager.count();
                        if before != after {
                            tracing::info!(
                                removed = before - after,
                                remaining = after,
                                "Job cleanup pass"
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Job cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(max_jobs: usize) -> JobManager {
        JobManager::new(&JobConfig {
            max_jobs,
            timeout_secs: 3600,
            cleanup_interval_secs: 300,
        })
    }

    #[test]
    fn test_job_lifecycle() {
        let manager = manager(4);
        let (job, _tx) = manager.create().unwrap();
        assert_eq!(job.status(), JobStatus::Queued);

        job.set_status(JobStatus::Running);
        assert_eq!(manager.get(&job.id).unwrap().status(), JobStatus::Running);

        manager.remove(&job.id);
        assert!(manager.get(&job.id).is_none());
    }

    #[test]
    fn test_capacity_limit() {
        let manager = manager(1);
        let (_job, _tx) = manager.create().unwrap();
        assert!(manager.create().is_err());
    }

    #[test]
    fn test_events_taken_once() {
        let manager = manager(4);
        let (job, _tx) = manager.create().unwrap();
        assert!(job.take_events().is_some());
        assert!(job.take_events().is_none());
    }

    #[tokio::test]
    async fn test_events_flow_through() {
        let manager = manager(4);
        let (job, tx) = manager.create().unwrap();
        tx.send(StageEvent::Transcription("hi".to_string()))
            .await
            .unwrap();
        drop(tx);

        let mut rx = job.take_events().unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(event.step(), "transcription");
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_expiry() {
        let manager = JobManager::new(&JobConfig {
            max_jobs: 4,
            timeout_secs: 0,
            cleanup_interval_secs: 1,
        });
        let (job, _tx) = manager.create().unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert!(job.is_expired(Duration::from_millis(1)));
        manager.cleanup_expired();
        assert_eq!(manager.count(), 0);
    }
}
