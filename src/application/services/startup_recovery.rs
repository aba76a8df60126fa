use std::sync::Arc;

use crate::application::ports::{JobRepository, SessionRepository};
use crate::domain::SessionId;

pub const RECOVERY_MESSAGE: &str = "Process restarted while job was in progress";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryReport {
    pub stuck_jobs: usize,
    pub failed_jobs: usize,
    pub reset_sessions: u64,
}

/// Fails every job left mid-flight by a previous process. Assumes a single
/// running instance.
pub struct StartupRecovery {
    jobs: Arc<dyn JobRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl StartupRecovery {
    pub fn new(jobs: Arc<dyn JobRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { jobs, sessions }
    }

    #[tracing::instrument(skip(self))]
    pub async fn sweep(&self) -> RecoveryReport {
        let mut report = RecoveryReport::default();

        let stuck = match self.jobs.list_active().await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::error!(error = %e, "Failed to query stuck jobs");
                return report;
            }
        };
        if stuck.is_empty() {
            tracing::info!("No stuck jobs found");
            return report;
        }
        report.stuck_jobs = stuck.len();

        let mut sessions: Vec<SessionId> = Vec::new();
        for job in &stuck {
            tracing::info!(
                job_id = %job.id,
                status = %job.status,
                session_id = %job.session_id,
                updated_at = %job.updated_at,
                "Recovering stuck job"
            );
            match self.jobs.fail(job.id, RECOVERY_MESSAGE).await {
                Ok(true) => report.failed_jobs += 1,
                Ok(false) => tracing::debug!(job_id = %job.id, "Job finished before recovery"),
                Err(e) => tracing::error!(job_id = %job.id, error = %e, "Failed to mark stuck job"),
            }
            if !sessions.contains(&job.session_id) {
                sessions.push(job.session_id.clone());
            }
        }

        match self.sessions.reset_to_synced(&sessions).await {
            Ok(count) => report.reset_sessions = count,
            Err(e) => tracing::warn!(error = %e, "Failed to reset session statuses"),
        }

        tracing::info!(
            failed_jobs = report.failed_jobs,
            reset_sessions = report.reset_sessions,
            "Startup recovery complete"
        );
        report
    }
}
