use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{JobRepository, ObjectStorage, TranscriptionProvider};

use super::{PipelineError, RunContext, StageFlow, StageHandler};

pub struct TranscriptionSubmission {
    storage: Arc<dyn ObjectStorage>,
    provider: Arc<dyn TranscriptionProvider>,
    jobs: Arc<dyn JobRepository>,
    signed_url_expiry: Duration,
    callback_url: String,
}

impl TranscriptionSubmission {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        provider: Arc<dyn TranscriptionProvider>,
        jobs: Arc<dyn JobRepository>,
        signed_url_expiry: Duration,
        callback_url: String,
    ) -> Self {
        Self {
            storage,
            provider,
            jobs,
            signed_url_expiry,
            callback_url,
        }
    }
}

#[async_trait]
impl StageHandler for TranscriptionSubmission {
    async fn execute(&self, ctx: &mut RunContext) -> Result<StageFlow, PipelineError> {
        let path = ctx
            .session
            .merged_audio_path
            .clone()
            .ok_or(PipelineError::MissingArtifact("merged audio path"))?;

        let audio_url = self
            .storage
            .signed_url(&ctx.session.location.bucket, &path, self.signed_url_expiry)
            .await?;

        let tracking_id = self.provider.submit(&audio_url, &self.callback_url).await?;

        if let Some(deadline) = ctx.deadline.as_ref() {
            if !deadline.disarm() {
                return Err(PipelineError::TimedOut(deadline.limit_secs()));
            }
            tracing::debug!("Pre-webhook timeout cleared");
        }

        if !self.jobs.set_tracking_id(ctx.job_id, &tracking_id).await? {
            return Err(PipelineError::Superseded(ctx.job_id));
        }

        tracing::info!(tracking_id = %tracking_id, "Transcription submitted, awaiting webhook");
        ctx.tracking_id = Some(tracking_id);
        Ok(StageFlow::Suspend)
    }
}
