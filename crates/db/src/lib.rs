//! sqlx/PostgreSQL persistence for the deck and collection engine.
//!
//! Repositories are zero-sized structs with async functions taking `&PgPool`.
//! The store handle is constructed explicitly at process start and passed
//! down; there is no module-level global client.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Errors from repositories whose transactions enforce domain rules.
///
/// Plain CRUD repositories return `sqlx::Error` directly; this type exists
/// for the paths where a transaction can be rejected by `deckforge_core`
/// validation (composition commits, bulk operations, ownership projection).
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] deckforge_core::error::CoreError),
}

impl From<deckforge_core::composition::CompositionViolation> for DbError {
    fn from(violation: deckforge_core::composition::CompositionViolation) -> Self {
        Self::Core(violation.into())
    }
}

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Run embedded migrations to bring the schema up to date.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("running database migrations");
    sqlx::migrate!("./migrations").run(pool).await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
