#![allow(dead_code)]

pub mod test_postgres;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use scribe_pipeline::application::ports::{
    DocumentRepository, JobRepository, LlmClient, LlmClientError, ProviderTranscript,
    SessionRepository, TranscriptStatus, TranscriptionError, TranscriptionProvider,
};
use scribe_pipeline::application::services::{
    LlmClientRegistry, PipelineDependencies, PipelineOptions, PipelineOrchestrator,
};
use scribe_pipeline::domain::{
    AiProvider, DocumentTemplate, Job, SessionId, SessionRecord, StorageLocation, TrackingId,
};
use scribe_pipeline::infrastructure::persistence::{
    InMemoryDocumentRepository, InMemoryJobRepository, InMemorySessionRepository,
};
use scribe_pipeline::infrastructure::storage::InMemoryObjectStorage;

pub const BUCKET: &str = "recordings";
pub const TRACKING_ID: &str = "tr-001";

/// 16 kHz mono 16-bit PCM file with `payload_len` bytes of `fill`.
pub fn wav_bytes(payload_len: usize, fill: u8) -> Vec<u8> {
    let sample_rate: u32 = 16_000;
    let channels: u16 = 1;
    let bits: u16 = 16;
    let block_align = channels * bits / 8;
    let byte_rate = sample_rate * block_align as u32;

    let mut out = Vec::with_capacity(44 + payload_len);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + payload_len as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(payload_len as u32).to_le_bytes());
    out.extend(std::iter::repeat_n(fill, payload_len));
    out
}

pub fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Transcription service double: hands out a fixed tracking id and returns
/// whatever transcript the test scripted.
pub struct FakeTranscriptionProvider {
    submit_delay: Duration,
    transcript: Mutex<ProviderTranscript>,
    submitted: Mutex<Vec<(String, String)>>,
}

impl FakeTranscriptionProvider {
    pub fn new() -> Self {
        Self {
            submit_delay: Duration::ZERO,
            transcript: Mutex::new(completed_transcript("hello from the session")),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    pub fn respond_with(&self, transcript: ProviderTranscript) {
        *self.transcript.lock().unwrap() = transcript;
    }

    pub fn submissions(&self) -> Vec<(String, String)> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptionProvider for FakeTranscriptionProvider {
    async fn submit(
        &self,
        audio_url: &str,
        webhook_url: &str,
    ) -> Result<TrackingId, TranscriptionError> {
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
        self.submitted
            .lock()
            .unwrap()
            .push((audio_url.to_string(), webhook_url.to_string()));
        Ok(TrackingId::new(TRACKING_ID))
    }

    async fn fetch(
        &self,
        _tracking_id: &TrackingId,
    ) -> Result<ProviderTranscript, TranscriptionError> {
        Ok(self.transcript.lock().unwrap().clone())
    }
}

pub fn completed_transcript(text: &str) -> ProviderTranscript {
    ProviderTranscript {
        status: TranscriptStatus::Completed,
        text: Some(text.to_string()),
        error: None,
    }
}

/// LLM double keyed by model name. Unknown models echo the model back.
#[derive(Default)]
pub struct ScriptedLlm {
    failures: HashMap<String, String>,
    delay: Option<Duration>,
}

impl ScriptedLlm {
    pub fn failing(mut self, model: &str, reason: &str) -> Self {
        self.failures.insert(model.to_string(), reason.to_string());
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(
        &self,
        model: &str,
        _prompt: &str,
        transcript: &str,
    ) -> Result<String, LlmClientError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failures.get(model) {
            Some(reason) => Err(LlmClientError::ApiRequestFailed(reason.clone())),
            None => Ok(format!("[{}] {}", model, transcript)),
        }
    }
}

pub fn openai_registry(llm: ScriptedLlm) -> LlmClientRegistry {
    LlmClientRegistry::new().with(AiProvider::OpenAi, Arc::new(llm))
}

/// In-memory wiring of every port the orchestrator needs.
pub struct Fixture {
    pub jobs: Arc<InMemoryJobRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub documents: Arc<InMemoryDocumentRepository>,
    pub storage: Arc<InMemoryObjectStorage>,
    pub transcription: Arc<FakeTranscriptionProvider>,
    pub temp: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_provider(FakeTranscriptionProvider::new())
    }

    pub fn with_provider(provider: FakeTranscriptionProvider) -> Self {
        Self {
            jobs: Arc::new(InMemoryJobRepository::new()),
            sessions: Arc::new(InMemorySessionRepository::new()),
            documents: Arc::new(InMemoryDocumentRepository::new()),
            storage: Arc::new(InMemoryObjectStorage::new()),
            transcription: Arc::new(provider),
            temp: TempDir::new().unwrap(),
        }
    }

    pub fn options(&self) -> PipelineOptions {
        PipelineOptions {
            temp_dir: self.temp.path().to_path_buf(),
            public_base_url: "https://scribe.test".to_string(),
            webhook_token: "secret".to_string(),
            ..PipelineOptions::default()
        }
    }

    pub fn orchestrator(&self, llm: LlmClientRegistry) -> PipelineOrchestrator {
        self.orchestrator_with(llm, self.options())
    }

    pub fn orchestrator_with(
        &self,
        llm: LlmClientRegistry,
        options: PipelineOptions,
    ) -> PipelineOrchestrator {
        let jobs: Arc<dyn JobRepository> = self.jobs.clone();
        let sessions: Arc<dyn SessionRepository> = self.sessions.clone();
        let documents: Arc<dyn DocumentRepository> = self.documents.clone();
        PipelineOrchestrator::new(
            PipelineDependencies {
                jobs,
                sessions,
                documents,
                storage: self.storage.clone(),
                transcription: self.transcription.clone(),
                llm,
            },
            &options,
        )
        .unwrap()
    }

    /// Creates a synced session and uploads one object per `(file_name, bytes)`.
    pub async fn seed_session(&self, id: &str, chunks: Vec<(&str, Vec<u8>)>) -> SessionRecord {
        let location = StorageLocation::new(BUCKET, format!("sessions/{}", id));
        let session = SessionRecord::new(SessionId::new(id), location.clone(), chunks.len() as u32);
        self.sessions.create(&session).await.unwrap();
        for (name, bytes) in chunks {
            self.storage
                .put_bytes(BUCKET, &location.object(name), bytes)
                .await
                .unwrap();
        }
        session
    }

    pub async fn create_job(&self, session: &SessionRecord) -> Job {
        let job = Job::new(session.id.clone());
        self.jobs.create(&job).await.unwrap();
        job
    }

    pub async fn add_template(&self, title: &str, provider: &str, model: &str) -> DocumentTemplate {
        let template = DocumentTemplate::new(title, provider, model, format!("Write the {}", title));
        self.documents.create_template(&template).await.unwrap();
        template
    }

    pub async fn job(&self, job: &Job) -> Job {
        self.jobs.get_by_id(job.id).await.unwrap().unwrap()
    }

    pub async fn session(&self, session: &SessionRecord) -> SessionRecord {
        self.sessions.get(&session.id).await.unwrap().unwrap()
    }
}
