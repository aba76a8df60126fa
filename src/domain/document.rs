use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateId(Uuid);

impl TemplateId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TemplateId {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for one artifact generated from a transcript.
///
/// `provider` is kept as the raw configured string so an unsupported value is
/// reported per template at generation time instead of failing the whole load.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTemplate {
    pub id: TemplateId,
    pub title: String,
    pub provider: String,
    pub model: String,
    pub prompt: String,
}

impl DocumentTemplate {
    pub fn new(
        title: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: TemplateId::new(),
            title: title.into(),
            provider: provider.into(),
            model: model.into(),
            prompt: prompt.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub session_id: SessionId,
    pub template_id: TemplateId,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(session_id: SessionId, template: &DocumentTemplate, text: String) -> Self {
        Self {
            id: DocumentId::new(),
            session_id,
            template_id: template.id,
            title: template.title.clone(),
            text,
            created_at: Utc::now(),
        }
    }
}
