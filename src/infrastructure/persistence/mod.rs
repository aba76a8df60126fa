mod pg_pool;
mod repositories;

pub use repositories::InMemoryDocumentRepository;
pub use repositories::InMemoryJobRepository;
pub use repositories::InMemorySessionRepository;
pub use repositories::PgDocumentRepository;
pub use repositories::PgJobRepository;
pub use repositories::PgSessionRepository;

pub use pg_pool::{create_pool, run_migrations};
