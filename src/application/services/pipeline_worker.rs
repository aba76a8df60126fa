use std::any::Any;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::ports::TranscriptStatus;
use crate::domain::{JobId, PipelineStage, SessionId, TrackingId};

use super::{PendingFaults, PipelineOrchestrator, RunOutcome};

#[derive(Debug, Clone)]
pub enum PipelineMessage {
    Run {
        job_id: JobId,
        session_id: SessionId,
        fail_at_stage: Option<PipelineStage>,
    },
    Resume {
        job_id: JobId,
        session_id: SessionId,
        tracking_id: TrackingId,
        status: TranscriptStatus,
    },
}

impl PipelineMessage {
    pub fn job_id(&self) -> JobId {
        match self {
            PipelineMessage::Run { job_id, .. } | PipelineMessage::Resume { job_id, .. } => *job_id,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("pipeline queue closed")]
    Closed,
}

/// Sending half of the worker channel. Enqueueing succeeds only once the
/// message is owned by the channel.
#[derive(Clone)]
pub struct PipelineQueue {
    sender: mpsc::Sender<PipelineMessage>,
}

impl PipelineQueue {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PipelineMessage>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    pub async fn enqueue(&self, message: PipelineMessage) -> Result<(), QueueError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| QueueError::Closed)
    }
}

/// Consumes pipeline messages, running each job as its own task.
pub struct PipelineWorker {
    receiver: mpsc::Receiver<PipelineMessage>,
    orchestrator: Arc<PipelineOrchestrator>,
    faults: Arc<PendingFaults>,
}

impl PipelineWorker {
    pub fn new(
        receiver: mpsc::Receiver<PipelineMessage>,
        orchestrator: Arc<PipelineOrchestrator>,
    ) -> Self {
        Self {
            receiver,
            orchestrator,
            faults: Arc::new(PendingFaults::new()),
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Pipeline worker started");
        while let Some(msg) = self.receiver.recv().await {
            let orchestrator = Arc::clone(&self.orchestrator);
            let faults = Arc::clone(&self.faults);
            tokio::spawn(async move {
                supervise(orchestrator, faults, msg).await;
            });
        }
        tracing::info!("Pipeline worker stopped: channel closed");
    }
}

/// Executes one message and turns a panic inside the run into a failed job.
/// A fault requested by a `Run` stays registered while the job is suspended
/// and applies to its `Resume`.
pub async fn supervise(
    orchestrator: Arc<PipelineOrchestrator>,
    faults: Arc<PendingFaults>,
    msg: PipelineMessage,
) -> Option<RunOutcome> {
    let job_id = msg.job_id();
    let runner = Arc::clone(&orchestrator);
    let task_faults = Arc::clone(&faults);
    let handle = tokio::spawn(async move { execute(&runner, &task_faults, msg).await });

    let outcome = match handle.await {
        Ok(outcome) => Some(outcome),
        Err(e) if e.is_panic() => {
            let message = format!("Pipeline task panicked: {}", panic_message(e.into_panic()));
            tracing::error!(job_id = %job_id, error = %message, "Pipeline task panicked");
            orchestrator.mark_failed(job_id, &message).await;
            None
        }
        Err(e) => {
            tracing::warn!(job_id = %job_id, error = %e, "Pipeline task cancelled");
            None
        }
    };

    if !matches!(outcome, Some(RunOutcome::Suspended(_))) {
        faults.forget(job_id);
    }
    outcome
}

async fn execute(
    orchestrator: &PipelineOrchestrator,
    faults: &PendingFaults,
    msg: PipelineMessage,
) -> RunOutcome {
    match msg {
        PipelineMessage::Run {
            job_id,
            session_id,
            fail_at_stage,
        } => {
            if let Some(stage) = fail_at_stage {
                faults.register(job_id, stage);
            }
            orchestrator.run(job_id, &session_id, faults).await
        }
        PipelineMessage::Resume {
            job_id,
            session_id,
            tracking_id,
            status,
        } => {
            orchestrator
                .resume(job_id, &session_id, &tracking_id, status, faults)
                .await
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
