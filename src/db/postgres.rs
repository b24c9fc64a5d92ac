use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{MoodStore, StoreResult};
use crate::models::mood::{MoodChanges, MoodEntry};

pub struct PgMoodStore {
    pool: PgPool,
}

impl PgMoodStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MoodStore for PgMoodStore {
    async fn list_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<MoodEntry>> {
        sqlx::query_as::<_, MoodEntry>(
            r#"
            SELECT id, owner_id, mood, notes, created_at FROM mood_entries
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn insert(&self, entry: MoodEntry) -> StoreResult<MoodEntry> {
        sqlx::query_as::<_, MoodEntry>(
            r#"
            INSERT INTO mood_entries (id, owner_id, mood, notes, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, mood, notes, created_at
            "#,
        )
        .bind(entry.id)
        .bind(entry.owner_id)
        .bind(entry.mood)
        .bind(&entry.notes)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<MoodEntry>> {
        sqlx::query_as::<_, MoodEntry>(
            "SELECT id, owner_id, mood, notes, created_at FROM mood_entries WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: &MoodChanges,
    ) -> StoreResult<Option<MoodEntry>> {
        sqlx::query_as::<_, MoodEntry>(
            r#"
            UPDATE mood_entries SET
                mood = COALESCE($3, mood),
                notes = COALESCE($4, notes)
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, mood, notes, created_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(changes.mood)
        .bind(&changes.notes)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM mood_entries WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use crate::models::mood::Mood;

    const MIGRATION: &str =
        include_str!("../../migrations/20240601000000_create_mood_entries.sql");

    #[test]
    fn column_type_lists_every_mood_label() {
        for mood in Mood::ALL {
            assert!(
                MIGRATION.contains(&format!("'{}'", mood.as_str())),
                "mood_label is missing {mood}"
            );
        }
        let declared = MIGRATION
            .split("ENUM (")
            .nth(1)
            .and_then(|rest| rest.split(')').next())
            .map(|labels| labels.matches('\'').count() / 2)
            .unwrap_or(0);
        assert_eq!(declared, Mood::ALL.len());
    }
}
