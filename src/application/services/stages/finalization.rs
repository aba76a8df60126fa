use std::sync::Arc;

use chrono::Utc;

use crate::application::ports::{JobRepository, ObjectStorage};

use super::{PipelineError, RunContext};

/// Removes per-chunk objects and marks the job completed.
pub struct Finalizer {
    storage: Arc<dyn ObjectStorage>,
    jobs: Arc<dyn JobRepository>,
    merged_file_name: String,
}

impl Finalizer {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        jobs: Arc<dyn JobRepository>,
        merged_file_name: String,
    ) -> Self {
        Self {
            storage,
            jobs,
            merged_file_name,
        }
    }

    pub async fn finalize(&self, ctx: &RunContext) -> Result<(), PipelineError> {
        self.delete_chunks(ctx).await;

        if !self.jobs.complete(ctx.job_id, Utc::now()).await? {
            return Err(PipelineError::Superseded(ctx.job_id));
        }
        tracing::info!("Job completed");
        Ok(())
    }

    async fn delete_chunks(&self, ctx: &RunContext) {
        let location = &ctx.session.location;
        let objects = match self.storage.list(&location.bucket, &location.prefix).await {
            Ok(objects) => objects,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list chunks for cleanup");
                return;
            }
        };

        let mut deleted = 0usize;
        for obj in objects
            .iter()
            .filter(|o| o.path.file_name() != self.merged_file_name)
        {
            match self.storage.delete(&location.bucket, &obj.path).await {
                Ok(()) => deleted += 1,
                Err(e) => tracing::warn!(path = %obj.path, error = %e, "Failed to delete chunk"),
            }
        }
        tracing::debug!(deleted, "Chunk objects removed");
    }
}
