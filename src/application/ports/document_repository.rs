use async_trait::async_trait;

use crate::domain::{Document, DocumentTemplate, SessionId};

use super::RepositoryError;

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn list_templates(&self) -> Result<Vec<DocumentTemplate>, RepositoryError>;

    async fn create_template(&self, template: &DocumentTemplate) -> Result<(), RepositoryError>;

    async fn insert_document(&self, document: &Document) -> Result<(), RepositoryError>;

    async fn list_documents(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<Document>, RepositoryError>;
}
