use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use scribe_pipeline::application::ports::{
    DocumentRepository, JobRepository, SessionRepository, TranscriptionProvider,
};
use scribe_pipeline::application::services::{
    PipelineDependencies, PipelineOrchestrator, PipelineQueue, PipelineWorker, ProcessingService,
    StartupRecovery, TranscriptionWebhookService,
};
use scribe_pipeline::infrastructure::audio::AssemblyAiClient;
use scribe_pipeline::infrastructure::llm::LlmClientFactory;
use scribe_pipeline::infrastructure::observability::{TracingConfig, init_tracing};
use scribe_pipeline::infrastructure::persistence::{
    PgDocumentRepository, PgJobRepository, PgSessionRepository, create_pool, run_migrations,
};
use scribe_pipeline::infrastructure::storage::ObjectStorageFactory;
use scribe_pipeline::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(
        &TracingConfig::from_settings(environment, &settings.logging),
        settings.server.port,
    );

    let pool = create_pool(&settings.database.url, settings.database.max_connections)
        .await
        .context("Failed to connect to PostgreSQL")?;
    if settings.database.run_migrations {
        run_migrations(&pool).await?;
    }

    let jobs: Arc<dyn JobRepository> = Arc::new(PgJobRepository::new(pool.clone()));
    let sessions: Arc<dyn SessionRepository> = Arc::new(PgSessionRepository::new(pool.clone()));
    let documents: Arc<dyn DocumentRepository> = Arc::new(PgDocumentRepository::new(pool));

    let storage = ObjectStorageFactory::create(&settings.storage)
        .context("Failed to initialize object storage")?;
    let transcription: Arc<dyn TranscriptionProvider> = Arc::new(AssemblyAiClient::new(
        settings.transcription.api_key.clone(),
        Some(settings.transcription.base_url.clone()),
        settings.transcription.language_code.clone(),
    ));
    let llm = LlmClientFactory::create(&settings.llm);

    if settings.transcription.webhook_token.is_empty() {
        tracing::warn!("Webhook token is not configured; every transcription callback will be rejected");
    }

    let options = settings.pipeline_options();
    let orchestrator = Arc::new(PipelineOrchestrator::new(
        PipelineDependencies {
            jobs: Arc::clone(&jobs),
            sessions: Arc::clone(&sessions),
            documents: Arc::clone(&documents),
            storage,
            transcription,
            llm,
        },
        &options,
    )
    .context("Invalid pipeline configuration")?);

    let report = StartupRecovery::new(Arc::clone(&jobs), Arc::clone(&sessions))
        .sweep()
        .await;
    tracing::info!(
        stuck = report.stuck_jobs,
        failed = report.failed_jobs,
        reset_sessions = report.reset_sessions,
        "Startup recovery finished"
    );

    let (queue, receiver) = PipelineQueue::channel(settings.pipeline.queue_capacity);
    tokio::spawn(PipelineWorker::new(receiver, orchestrator).run());

    let state = AppState {
        processing_service: Arc::new(ProcessingService::new(
            Arc::clone(&jobs),
            Arc::clone(&sessions),
            documents,
            queue.clone(),
        )),
        webhook_service: Arc::new(TranscriptionWebhookService::new(
            jobs,
            queue,
            settings.transcription.webhook_token.clone(),
        )),
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
