use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{DocumentRepository, RepositoryError};
use crate::domain::{Document, DocumentId, DocumentTemplate, SessionId, TemplateId};

pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn template_from_row(row: &PgRow) -> Result<DocumentTemplate, RepositoryError> {
    let get_err = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());
    Ok(DocumentTemplate {
        id: TemplateId::from_uuid(row.try_get("id").map_err(get_err)?),
        title: row.try_get("title").map_err(get_err)?,
        provider: row.try_get("provider").map_err(get_err)?,
        model: row.try_get("model").map_err(get_err)?,
        prompt: row.try_get("prompt").map_err(get_err)?,
    })
}

fn document_from_row(row: &PgRow) -> Result<Document, RepositoryError> {
    let get_err = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());
    let session_id: String = row.try_get("session_id").map_err(get_err)?;
    Ok(Document {
        id: DocumentId::from_uuid(row.try_get("id").map_err(get_err)?),
        session_id: SessionId::new(session_id),
        template_id: TemplateId::from_uuid(row.try_get("template_id").map_err(get_err)?),
        title: row.try_get("title").map_err(get_err)?,
        text: row.try_get("text").map_err(get_err)?,
        created_at: row.try_get("created_at").map_err(get_err)?,
    })
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    #[instrument(skip(self))]
    async fn list_templates(&self) -> Result<Vec<DocumentTemplate>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, title, provider, model, prompt FROM document_templates ORDER BY title ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.iter().map(template_from_row).collect()
    }

    #[instrument(skip(self, template), fields(template_id = %template.id.as_uuid()))]
    async fn create_template(&self, template: &DocumentTemplate) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO document_templates (id, title, provider, model, prompt)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(template.id.as_uuid())
        .bind(&template.title)
        .bind(&template.provider)
        .bind(&template.model)
        .bind(&template.prompt)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self, document), fields(document_id = %document.id.as_uuid(), title = %document.title))]
    async fn insert_document(&self, document: &Document) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO documents (id, session_id, template_id, title, text, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(document.id.as_uuid())
        .bind(document.session_id.as_str())
        .bind(document.template_id.as_uuid())
        .bind(&document.title)
        .bind(&document.text)
        .bind(document.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %session_id))]
    async fn list_documents(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<Document>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, template_id, title, text, created_at
            FROM documents
            WHERE session_id = $1
            ORDER BY title ASC
            "#,
        )
        .bind(session_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.iter().map(document_from_row).collect()
    }
}
