use std::sync::Arc;

use crate::application::services::{ProcessingService, TranscriptionWebhookService};

#[derive(Clone)]
pub struct AppState {
    pub processing_service: Arc<ProcessingService>,
    pub webhook_service: Arc<TranscriptionWebhookService>,
}
