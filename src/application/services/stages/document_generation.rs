use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;

use crate::application::ports::{DocumentRepository, JobRepository};
use crate::application::services::LlmClientRegistry;
use crate::domain::{AiProvider, Document, DocumentTemplate, SessionId};

use super::{PipelineError, RunContext, StageFlow, StageHandler};

pub struct DocumentGeneration {
    documents: Arc<dyn DocumentRepository>,
    jobs: Arc<dyn JobRepository>,
    llm: LlmClientRegistry,
    per_document_timeout: Duration,
}

impl DocumentGeneration {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        jobs: Arc<dyn JobRepository>,
        llm: LlmClientRegistry,
        per_document_timeout: Duration,
    ) -> Self {
        Self {
            documents,
            jobs,
            llm,
            per_document_timeout,
        }
    }

    async fn generate_one(
        &self,
        session_id: &SessionId,
        template: &DocumentTemplate,
        transcript: &str,
    ) -> Result<Document, String> {
        let provider: AiProvider = template.provider.parse()?;
        if template.prompt.trim().is_empty() {
            return Err("Empty prompt configured".to_string());
        }
        let client = self
            .llm
            .get(provider)
            .ok_or_else(|| format!("No client configured for provider: {}", provider))?;

        let text = tokio::time::timeout(
            self.per_document_timeout,
            client.generate(&template.model, &template.prompt, transcript),
        )
        .await
        .map_err(|_| format!("Timed out after {}s", self.per_document_timeout.as_secs()))?
        .map_err(|e| e.to_string())?;

        if text.trim().is_empty() {
            return Err("AI returned empty text".to_string());
        }

        let document = Document::new(session_id.clone(), template, text);
        self.documents
            .insert_document(&document)
            .await
            .map_err(|e| format!("DB insert failed: {}", e))?;

        tracing::debug!(
            title = %template.title,
            provider = %provider,
            chars = document.text.len(),
            "Document generated"
        );
        Ok(document)
    }
}

#[async_trait]
impl StageHandler for DocumentGeneration {
    async fn execute(&self, ctx: &mut RunContext) -> Result<StageFlow, PipelineError> {
        let transcript = ctx
            .session
            .raw_transcript
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(PipelineError::MissingArtifact("raw transcript"))?;

        let templates = self.documents.list_templates().await?;
        if templates.is_empty() {
            return Err(PipelineError::NoTemplates);
        }

        let session_id = ctx.session.id.clone();
        let results = join_all(
            templates
                .iter()
                .map(|t| self.generate_one(&session_id, t, &transcript)),
        )
        .await;

        let total = templates.len();
        let failures: Vec<String> = templates
            .iter()
            .zip(results)
            .filter_map(|(t, r)| r.err().map(|reason| format!("\"{}\": {}", t.title, reason)))
            .collect();

        if failures.len() == total {
            return Err(PipelineError::DocumentGeneration(format!(
                "All {} documents failed: {}",
                total,
                failures.join("; ")
            )));
        }

        if failures.is_empty() {
            tracing::info!(documents = total, "All documents generated");
        } else {
            let summary = format!(
                "Partial: {}/{} failed. {}",
                failures.len(),
                total,
                failures.join("; ")
            );
            tracing::warn!(failed = failures.len(), total, "Some documents failed");
            if !self.jobs.set_error_message(ctx.job_id, &summary).await? {
                return Err(PipelineError::Superseded(ctx.job_id));
            }
        }

        Ok(StageFlow::Continue)
    }
}
