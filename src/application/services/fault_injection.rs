use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::{JobId, PipelineStage};

use super::PipelineError;

/// Decides whether a stage should be replaced by a synthetic failure.
pub trait FaultInjector: Send + Sync {
    fn should_fail(&self, job_id: JobId, stage: PipelineStage) -> bool;

    fn check(&self, job_id: JobId, stage: PipelineStage) -> Result<(), PipelineError> {
        if self.should_fail(job_id, stage) {
            tracing::warn!(stage = %stage, "Injecting simulated stage failure");
            return Err(PipelineError::InjectedFault(stage));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoFaults;

impl FaultInjector for NoFaults {
    fn should_fail(&self, _job_id: JobId, _stage: PipelineStage) -> bool {
        false
    }
}

/// Fails the first time `stage` is reached.
#[derive(Debug)]
pub struct FailAtStage {
    stage: PipelineStage,
    tripped: AtomicBool,
}

impl FailAtStage {
    pub fn new(stage: PipelineStage) -> Self {
        Self {
            stage,
            tripped: AtomicBool::new(false),
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }
}

impl FaultInjector for FailAtStage {
    fn should_fail(&self, _job_id: JobId, stage: PipelineStage) -> bool {
        stage == self.stage && !self.tripped.swap(true, Ordering::SeqCst)
    }
}

/// Requested failure stages keyed by job. An entry outlives a webhook
/// suspension and is consumed when it fires.
#[derive(Debug, Default)]
pub struct PendingFaults {
    stages: Mutex<HashMap<JobId, PipelineStage>>,
}

impl PendingFaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, job_id: JobId, stage: PipelineStage) {
        tracing::debug!(job_id = %job_id, stage = %stage, "Fault requested for job");
        self.lock().insert(job_id, stage);
    }

    pub fn pending(&self, job_id: JobId) -> Option<PipelineStage> {
        self.lock().get(&job_id).copied()
    }

    pub fn forget(&self, job_id: JobId) {
        self.lock().remove(&job_id);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, PipelineStage>> {
        self.stages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FaultInjector for PendingFaults {
    fn should_fail(&self, job_id: JobId, stage: PipelineStage) -> bool {
        let mut stages = self.lock();
        if stages.get(&job_id) == Some(&stage) {
            stages.remove(&job_id);
            return true;
        }
        false
    }
}
