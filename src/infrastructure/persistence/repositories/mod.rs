mod in_memory_repository;
mod pg_document_repository;
mod pg_job_repository;
mod pg_session_repository;

pub use in_memory_repository::InMemoryDocumentRepository;
pub use in_memory_repository::InMemoryJobRepository;
pub use in_memory_repository::InMemorySessionRepository;
pub use pg_document_repository::PgDocumentRepository;
pub use pg_job_repository::PgJobRepository;
pub use pg_session_repository::PgSessionRepository;
