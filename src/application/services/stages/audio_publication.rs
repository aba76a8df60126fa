use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{ObjectStorage, SessionRepository};

use super::{PipelineError, RunContext, StageFlow, StageHandler};

pub struct AudioPublication {
    storage: Arc<dyn ObjectStorage>,
    sessions: Arc<dyn SessionRepository>,
    merged_file_name: String,
}

impl AudioPublication {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        sessions: Arc<dyn SessionRepository>,
        merged_file_name: String,
    ) -> Self {
        Self {
            storage,
            sessions,
            merged_file_name,
        }
    }
}

#[async_trait]
impl StageHandler for AudioPublication {
    async fn execute(&self, ctx: &mut RunContext) -> Result<StageFlow, PipelineError> {
        let local = ctx
            .merged_audio
            .clone()
            .ok_or(PipelineError::MissingArtifact("merged audio file"))?;
        let bucket = ctx.session.location.bucket.clone();
        let target = ctx.session.location.object(&self.merged_file_name);

        let bytes = self
            .storage
            .upload_file(&bucket, &target, &local, "audio/wav")
            .await?;

        self.sessions
            .set_merged_audio_path(&ctx.session.id, &target)
            .await?;
        ctx.session.merged_audio_path = Some(target.clone());

        tracing::info!(path = %target, bytes, "Merged audio published");
        Ok(StageFlow::Continue)
    }
}
