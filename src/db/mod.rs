use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::mood::{MoodChanges, MoodEntry};

pub mod memory;
pub mod pool;
pub mod postgres;

pub use memory::MemoryMoodStore;
pub use postgres::PgMoodStore;

/// `DATABASE_URL` value selecting the in-process store.
pub const MEMORY_URL: &str = "memory://";

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Persistence contract for mood entries. Every method is a single
/// document operation; there are no cross-entry transactions.
#[async_trait]
pub trait MoodStore: Send + Sync {
    /// Entries of `owner_id`, newest first.
    async fn list_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<MoodEntry>>;

    async fn insert(&self, entry: MoodEntry) -> StoreResult<MoodEntry>;

    async fn find(&self, id: Uuid) -> StoreResult<Option<MoodEntry>>;

    /// Apply `changes` to the entry if it is still owned by `owner_id`.
    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: &MoodChanges,
    ) -> StoreResult<Option<MoodEntry>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool>;

    async fn ping(&self) -> StoreResult<()>;
}

/// Open the store named by `database_url`: `memory://` or a PostgreSQL URL.
/// PostgreSQL stores have their migrations applied before returning.
pub async fn connect(database_url: &str) -> anyhow::Result<Arc<dyn MoodStore>> {
    if database_url.starts_with(MEMORY_URL) {
        tracing::warn!("Using in-memory mood store; entries are lost on restart");
        return Ok(Arc::new(MemoryMoodStore::new()));
    }

    let pool = pool::create_pool(database_url)
        .await
        .context("Failed to create database pool")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations applied");

    Ok(Arc::new(PgMoodStore::new(pool)))
}
