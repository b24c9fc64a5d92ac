use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{MoodStore, StoreResult};
use crate::models::mood::{MoodChanges, MoodEntry};

/// Process-local store for development runs and tests.
#[derive(Default)]
pub struct MemoryMoodStore {
    entries: RwLock<HashMap<Uuid, MoodEntry>>,
}

impl MemoryMoodStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl MoodStore for MemoryMoodStore {
    async fn list_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<MoodEntry>> {
        let entries = self.entries.read().await;
        let mut owned: Vec<MoodEntry> = entries
            .values()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn insert(&self, entry: MoodEntry) -> StoreResult<MoodEntry> {
        self.entries.write().await.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<MoodEntry>> {
        Ok(self.entries.read().await.get(&id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: &MoodChanges,
    ) -> StoreResult<Option<MoodEntry>> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&id) {
            Some(entry) if entry.owner_id == owner_id => {
                changes.apply(entry);
                Ok(Some(entry.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool> {
        let mut entries = self.entries.write().await;
        match entries.get(&id) {
            Some(entry) if entry.owner_id == owner_id => {
                entries.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
