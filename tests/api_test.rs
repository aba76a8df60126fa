use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use scribe_pipeline::application::ports::{DocumentRepository, JobRepository, SessionRepository};
use scribe_pipeline::application::services::{
    PipelineMessage, PipelineOptions, PipelineQueue, ProcessingService,
    TranscriptionWebhookService,
};
use scribe_pipeline::domain::{
    Document, DocumentTemplate, JobStatus, PipelineStage, SessionId, SessionRecord, SessionStatus,
    StorageLocation, TrackingId,
};
use scribe_pipeline::presentation::{AppState, create_router};

mod helpers;

use helpers::{BUCKET, Fixture};

const TOKEN: &str = "hook-token";

struct TestApp {
    fixture: Fixture,
    router: Router,
    receiver: mpsc::Receiver<PipelineMessage>,
}

fn test_app() -> TestApp {
    test_app_with_token(TOKEN)
}

fn test_app_with_token(token: &str) -> TestApp {
    let fixture = Fixture::new();
    let (queue, receiver) = PipelineQueue::channel(16);
    let state = AppState {
        processing_service: Arc::new(ProcessingService::new(
            fixture.jobs.clone(),
            fixture.sessions.clone(),
            fixture.documents.clone(),
            queue.clone(),
        )),
        webhook_service: Arc::new(TranscriptionWebhookService::new(
            fixture.jobs.clone(),
            queue,
            token.to_string(),
        )),
    };
    TestApp {
        fixture,
        router: create_router(state),
        receiver,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn given_running_app_when_checking_health_then_returns_healthy() {
    let app = test_app();

    let (status, body) = send(&app.router, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn given_synced_session_when_processing_then_returns_accepted_with_pending_job() {
    let mut app = test_app();
    app.fixture.seed_session("s-1", vec![]).await;

    let (status, body) = send(&app.router, post_empty("/api/v1/sessions/s-1/process")).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "pending");
    assert!(body["job_id"].as_str().is_some());
    assert!(app.receiver.try_recv().is_ok());
}

#[tokio::test]
async fn given_existing_job_when_processing_again_then_returns_ok_with_same_job() {
    let app = test_app();
    app.fixture.seed_session("s-1", vec![]).await;
    let (_, first) = send(&app.router, post_empty("/api/v1/sessions/s-1/process")).await;

    let (status, second) = send(&app.router, post_empty("/api/v1/sessions/s-1/process")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["job_id"], first["job_id"]);
}

#[tokio::test]
async fn given_fault_stage_in_body_when_processing_then_it_reaches_the_worker() {
    let mut app = test_app();
    app.fixture.seed_session("s-1", vec![]).await;

    let (status, _) = send(
        &app.router,
        post_json(
            "/api/v1/sessions/s-1/process",
            r#"{"fail_at_stage": "transcribing"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    match app.receiver.try_recv().unwrap() {
        PipelineMessage::Run { fail_at_stage, .. } => {
            assert_eq!(fail_at_stage, Some(PipelineStage::Transcribing));
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn given_unknown_session_when_processing_then_returns_not_found() {
    let app = test_app();

    let (status, body) = send(&app.router, post_empty("/api/v1/sessions/nope/process")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn given_session_not_synced_when_processing_then_returns_conflict_with_status() {
    let app = test_app();
    let mut session = SessionRecord::new(
        SessionId::new("s-2"),
        StorageLocation::new(BUCKET, "sessions/s-2"),
        1,
    );
    session.status = SessionStatus::Processing;
    app.fixture.sessions.create(&session).await.unwrap();

    let (status, body) = send(&app.router, post_empty("/api/v1/sessions/s-2/process")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["current_status"], "processing");
}

#[tokio::test]
async fn given_malformed_job_id_when_fetching_status_then_returns_bad_request() {
    let app = test_app();

    let (status, _) = send(&app.router, get("/api/v1/jobs/not-a-uuid")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_unknown_job_when_fetching_status_then_returns_not_found() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        get("/api/v1/jobs/00000000-0000-0000-0000-000000000000"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_completed_job_when_fetching_status_then_documents_are_included() {
    let app = test_app();
    let session = app.fixture.seed_session("s-3", vec![]).await;
    let job = app.fixture.create_job(&session).await;
    app.fixture
        .jobs
        .advance(job.id, JobStatus::GeneratingDocs)
        .await
        .unwrap();
    app.fixture
        .jobs
        .complete(job.id, chrono::Utc::now())
        .await
        .unwrap();
    let template = DocumentTemplate::new("Summary", "openai", "gpt-4o", "Summarize");
    app.fixture
        .documents
        .insert_document(&Document::new(session.id.clone(), &template, "short".into()))
        .await
        .unwrap();

    let (status, body) = send(&app.router, get(&format!("/api/v1/jobs/{}", job.id))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["session_id"], "s-3");
    assert!(body.get("error").is_none());
    assert!(body["completed_at"].as_str().is_some());
    assert_eq!(body["documents"][0]["title"], "Summary");
    assert_eq!(body["documents"][0]["text"], "short");
}

#[tokio::test]
async fn given_failed_job_when_fetching_status_then_error_is_reported_without_documents() {
    let app = test_app();
    let session = app.fixture.seed_session("s-4", vec![]).await;
    let job = app.fixture.create_job(&session).await;
    app.fixture.jobs.fail(job.id, "disk full").await.unwrap();

    let (status, body) = send(&app.router, get(&format!("/api/v1/jobs/{}", job.id))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["error"], "disk full");
    assert!(body.get("documents").is_none());
}

#[tokio::test]
async fn given_missing_token_when_calling_webhook_then_returns_unauthorized() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        post_json(
            "/assemblyai-webhook",
            r#"{"transcript_id": "tr-1", "status": "completed"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn given_wrong_token_and_garbage_body_when_calling_webhook_then_returns_unauthorized() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        post_json("/assemblyai-webhook?token=wrong", "not json"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn given_valid_token_without_transcript_id_when_calling_webhook_then_returns_bad_request() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        post_json(
            &format!("/assemblyai-webhook?token={TOKEN}"),
            r#"{"status": "completed"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_intermediate_status_when_calling_webhook_then_acknowledged_as_ignored() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        post_json(
            &format!("/assemblyai-webhook?token={TOKEN}"),
            r#"{"transcript_id": "tr-1", "status": "queued"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
    assert_eq!(body["ignored"], true);
    assert_eq!(body["reason"], "unexpected status: queued");
}

#[tokio::test]
async fn given_unknown_transcript_when_calling_webhook_then_acknowledged_as_unmatched() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        post_json(
            &format!("/assemblyai-webhook?token={TOKEN}"),
            r#"{"transcript_id": "tr-404", "status": "completed"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"], false);
}

#[tokio::test]
async fn given_transcribing_job_when_calling_webhook_then_resume_is_dispatched() {
    let mut app = test_app();
    let session = app.fixture.seed_session("s-5", vec![]).await;
    let job = app.fixture.create_job(&session).await;
    app.fixture
        .jobs
        .advance(job.id, JobStatus::Transcribing)
        .await
        .unwrap();
    app.fixture
        .jobs
        .set_tracking_id(job.id, &TrackingId::new("tr-5"))
        .await
        .unwrap();

    let (status, body) = send(
        &app.router,
        post_json(
            &format!("/assemblyai-webhook?token={TOKEN}"),
            r#"{"transcript_id": "tr-5", "status": "completed"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "received": true }));
    assert!(matches!(
        app.receiver.try_recv().unwrap(),
        PipelineMessage::Resume { job_id, .. } if job_id == job.id
    ));
}

#[tokio::test]
async fn given_token_with_reserved_characters_when_provider_calls_back_then_token_is_accepted() {
    let token = "s3&cr#t+tok=en";
    let app = test_app_with_token(token);
    let options = PipelineOptions {
        public_base_url: "https://scribe.test".to_string(),
        webhook_token: token.to_string(),
        ..PipelineOptions::default()
    };
    let callback = reqwest::Url::parse(&options.callback_url().unwrap()).unwrap();
    let uri = format!("{}?{}", callback.path(), callback.query().unwrap());

    let (status, body) = send(
        &app.router,
        post_json(&uri, r#"{"transcript_id": "tr-unknown", "status": "completed"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"], serde_json::json!(false));
}

#[tokio::test]
async fn given_request_without_id_when_served_then_response_carries_request_id() {
    let app = test_app();

    let response = app.router.clone().oneshot(get("/health")).await.unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}
