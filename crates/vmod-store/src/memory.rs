//! In-memory video record store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use vmod_models::{VideoId, VideoRecord};

use crate::error::StoreResult;
use crate::{RecordMutation, VideoStore};

/// In-memory store backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<VideoId, VideoRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, as the upload collaborator would.
    pub async fn insert(&self, record: VideoRecord) {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record);
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl VideoStore for MemoryStore {
    async fn get(&self, id: &VideoId) -> StoreResult<Option<VideoRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn save(&self, record: &VideoRecord) -> StoreResult<()> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: &VideoId,
        mutate: RecordMutation,
    ) -> StoreResult<Option<VideoRecord>> {
        let mut records = self.records.write().await;
        Ok(records.get_mut(id).map(|record| {
            mutate(record);
            record.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_record() {
        let store = MemoryStore::new();
        let got = store.get(&VideoId::from("missing")).await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_update_mutates_in_place() {
        let store = MemoryStore::new();
        let record = VideoRecord::new("t", "u", "a.mp4", "a.mp4");
        let id = record.id.clone();
        store.save(&record).await.unwrap();

        let updated = store
            .update(&id, Box::new(|r| r.thumbnail = Some("t.jpg".to_string())))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.thumbnail.as_deref(), Some("t.jpg"));

        let got = store.get(&id).await.unwrap().unwrap();
        assert_eq!(got.thumbnail.as_deref(), Some("t.jpg"));
    }

    #[tokio::test]
    async fn test_update_missing_record_is_none() {
        let store = MemoryStore::new();
        let result = store
            .update(&VideoId::from("missing"), Box::new(|r| r.analysis_retries = 9))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_full_document() {
        let store = MemoryStore::new();
        let mut record = VideoRecord::new("t", "u", "a.mp4", "a.mp4");
        store.save(&record).await.unwrap();

        record.analysis_retries = 2;
        store.save(&record).await.unwrap();

        let got = store.get(&record.id).await.unwrap().unwrap();
        assert_eq!(got.analysis_retries, 2);
        assert_eq!(store.len().await, 1);
    }
}
