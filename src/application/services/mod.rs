mod fault_injection;
mod llm_client_registry;
mod pipeline_error;
mod pipeline_options;
mod pipeline_orchestrator;
mod pipeline_worker;
mod processing_service;
mod startup_recovery;
mod timeout_supervisor;
mod transcription_webhook_service;

pub mod stages;

pub use fault_injection::{FailAtStage, FaultInjector, NoFaults, PendingFaults};
pub use llm_client_registry::LlmClientRegistry;
pub use pipeline_error::PipelineError;
pub use pipeline_options::PipelineOptions;
pub use pipeline_orchestrator::{
    PipelineDependencies, PipelineOrchestrator, RunOutcome, entry_stage,
};
pub use pipeline_worker::{PipelineMessage, PipelineQueue, PipelineWorker, QueueError, supervise};
pub use processing_service::{JobReport, ProcessingError, ProcessingService, StartOutcome};
pub use startup_recovery::{RECOVERY_MESSAGE, RecoveryReport, StartupRecovery};
pub use timeout_supervisor::{TimeoutGuard, TimeoutSupervisor};
pub use transcription_webhook_service::{
    TranscriptionCallback, TranscriptionWebhookService, WebhookError, WebhookOutcome,
};
