use scribe_pipeline::application::ports::{JobRepository, SessionRepository};
use scribe_pipeline::application::services::{RECOVERY_MESSAGE, RecoveryReport, StartupRecovery};
use scribe_pipeline::domain::{
    JobStatus, SessionId, SessionRecord, SessionStatus, StorageLocation,
};

mod helpers;

use helpers::{BUCKET, Fixture};

fn recovery(fixture: &Fixture) -> StartupRecovery {
    StartupRecovery::new(fixture.jobs.clone(), fixture.sessions.clone())
}

#[tokio::test]
async fn given_no_active_jobs_when_sweeping_then_nothing_changes() {
    let fixture = Fixture::new();

    let report = recovery(&fixture).sweep().await;

    assert_eq!(report, RecoveryReport::default());
}

#[tokio::test]
async fn given_mid_flight_and_completed_jobs_when_sweeping_then_only_mid_flight_job_fails() {
    let fixture = Fixture::new();
    let busy = fixture.seed_session("s-busy", vec![]).await;
    let done = fixture.seed_session("s-done", vec![]).await;
    let stuck = fixture.create_job(&busy).await;
    fixture
        .jobs
        .advance(stuck.id, JobStatus::Concatenating)
        .await
        .unwrap();
    let finished = fixture.create_job(&done).await;
    fixture
        .jobs
        .advance(finished.id, JobStatus::GeneratingDocs)
        .await
        .unwrap();
    fixture
        .jobs
        .complete(finished.id, chrono::Utc::now())
        .await
        .unwrap();

    let report = recovery(&fixture).sweep().await;

    assert_eq!(report.stuck_jobs, 1);
    assert_eq!(report.failed_jobs, 1);
    let stuck = fixture.job(&stuck).await;
    assert_eq!(stuck.status, JobStatus::Failed);
    assert_eq!(stuck.error_message.as_deref(), Some(RECOVERY_MESSAGE));
    let finished = fixture.job(&finished).await;
    assert_eq!(finished.status, JobStatus::Completed);
    assert!(finished.error_message.is_none());
}

#[tokio::test]
async fn given_processing_session_when_sweeping_then_session_returns_to_synced() {
    let fixture = Fixture::new();
    let mut session = SessionRecord::new(
        SessionId::new("s-1"),
        StorageLocation::new(BUCKET, "sessions/s-1"),
        1,
    );
    session.status = SessionStatus::Processing;
    fixture.sessions.create(&session).await.unwrap();
    let job = fixture.create_job(&session).await;
    fixture
        .jobs
        .advance(job.id, JobStatus::Transcribing)
        .await
        .unwrap();

    let report = recovery(&fixture).sweep().await;

    assert_eq!(report.reset_sessions, 1);
    assert_eq!(fixture.session(&session).await.status, SessionStatus::Synced);
}
