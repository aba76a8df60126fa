use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::application::ports::JobRepository;
use crate::domain::JobId;

use super::PipelineError;

const ARMED: u8 = 0;
const FIRED: u8 = 1;
const DISARMED: u8 = 2;

/// Bounds the pre-webhook part of a full run.
#[derive(Clone)]
pub struct TimeoutSupervisor {
    jobs: Arc<dyn JobRepository>,
    limit: Duration,
}

impl TimeoutSupervisor {
    pub fn new(jobs: Arc<dyn JobRepository>, limit: Duration) -> Self {
        Self { jobs, limit }
    }

    pub fn arm(&self, job_id: JobId) -> TimeoutGuard {
        let state = Arc::new(AtomicU8::new(ARMED));
        let limit_secs = self.limit.as_secs();
        let task_state = Arc::clone(&state);
        let jobs = Arc::clone(&self.jobs);
        let limit = self.limit;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            if task_state
                .compare_exchange(ARMED, FIRED, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return;
            }
            tracing::error!(
                job_id = %job_id,
                limit_secs,
                "Pre-webhook stages exceeded time limit"
            );
            let message = PipelineError::TimedOut(limit_secs).to_string();
            match jobs.fail(job_id, &message).await {
                Ok(true) => {}
                Ok(false) => tracing::debug!(job_id = %job_id, "Job already terminal at timeout"),
                Err(e) => tracing::error!(
                    job_id = %job_id,
                    error = %e,
                    "Failed to mark job as failed after timeout"
                ),
            }
        });

        tracing::debug!(job_id = %job_id, limit_secs, "Pre-webhook timeout armed");

        TimeoutGuard {
            state,
            handle,
            limit_secs,
        }
    }
}

/// Handle on an armed deadline. Dropping it cancels the timer.
pub struct TimeoutGuard {
    state: Arc<AtomicU8>,
    handle: JoinHandle<()>,
    limit_secs: u64,
}

impl TimeoutGuard {
    pub fn has_fired(&self) -> bool {
        self.state.load(Ordering::SeqCst) == FIRED
    }

    pub fn limit_secs(&self) -> u64 {
        self.limit_secs
    }

    /// Returns `false` when the deadline already fired.
    pub fn disarm(&self) -> bool {
        let disarmed = self
            .state
            .compare_exchange(ARMED, DISARMED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if disarmed {
            self.handle.abort();
        }
        disarmed
    }
}

impl Drop for TimeoutGuard {
    fn drop(&mut self) {
        if self.state.load(Ordering::SeqCst) != FIRED {
            self.handle.abort();
        }
    }
}
