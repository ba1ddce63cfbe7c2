// In-process document store; one write lock covers a document and its history

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::document::{history_collection, Document, HistoryEntry};
use super::filter::ListFilter;
use super::{DocumentStore, StoreError};

#[derive(Debug, Default)]
struct Collections {
    documents: HashMap<String, HashMap<Uuid, Document>>,
    /// Keyed by `<collection>_history`
    history: HashMap<String, Vec<HistoryEntry>>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, document: &Document) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let collection = inner
            .documents
            .entry(document.collection().to_string())
            .or_default();
        if collection.contains_key(&document.id) {
            return Err(StoreError::Duplicate(document.id));
        }
        collection.insert(document.id, document.clone());
        Ok(())
    }

    async fn find_one(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .documents
            .get(collection)
            .and_then(|documents| documents.get(&id))
            .cloned())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &ListFilter,
        viewer: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.read().await;
        let mut found: Vec<Document> = inner
            .documents
            .get(collection)
            .map(|documents| {
                documents
                    .values()
                    .filter(|document| filter.matches(document, viewer))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        found.sort_by(|a, b| b.body.created_at.cmp(&a.body.created_at));
        Ok(found)
    }

    async fn commit_transition(
        &self,
        expected_version: u64,
        updated: &Document,
        history: &HistoryEntry,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        let current = inner
            .documents
            .get_mut(updated.collection())
            .and_then(|documents| documents.get_mut(&updated.id))
            .ok_or_else(|| StoreError::NotFound {
                collection: updated.collection().to_string(),
                id: updated.id,
            })?;

        if current.version() != expected_version {
            return Err(StoreError::VersionConflict {
                id: updated.id,
                expected: expected_version,
                found: current.version(),
            });
        }

        *current = updated.clone();
        inner
            .history
            .entry(history_collection(history.collection()))
            .or_default()
            .push(history.clone());

        debug!(
            id = %updated.id,
            collection = %updated.collection(),
            version = updated.version(),
            "Transition committed"
        );
        Ok(())
    }

    async fn history(&self, collection: &str, id: Uuid) -> Result<Vec<HistoryEntry>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .history
            .get(&history_collection(collection))
            .map(|entries| {
                entries
                    .iter()
                    .rev()
                    .filter(|entry| entry.entity_id == id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pending(owner: &str) -> Document {
        Document::new("deviations", "pending", owner, json!({"reason": "burr"}))
    }

    #[tokio::test]
    async fn test_insert_and_find_one() {
        let store = MemoryStore::new();
        let doc = pending("a@bruss.example");
        store.insert(&doc).await.unwrap();

        let found = store.find_one("deviations", doc.id).await.unwrap();
        assert_eq!(found, Some(doc.clone()));
        assert!(store.find_one("overtime_orders", doc.id).await.unwrap().is_none());
        assert!(matches!(store.insert(&doc).await, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_commit_writes_document_and_history() {
        let store = MemoryStore::new();
        let doc = pending("a@bruss.example");
        store.insert(&doc).await.unwrap();

        let next = doc.transitioned("approved", None, "q@bruss.example");
        let entry = HistoryEntry::archive(&doc, "q@bruss.example");
        store.commit_transition(1, &next, &entry).await.unwrap();

        let stored = store.find_one("deviations", doc.id).await.unwrap().unwrap();
        assert_eq!(stored.status(), "approved");

        let history = store.history("deviations", doc.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].snapshot, doc.body);
    }

    #[tokio::test]
    async fn test_stale_version_writes_nothing() {
        let store = MemoryStore::new();
        let doc = pending("a@bruss.example");
        store.insert(&doc).await.unwrap();

        let first = doc.transitioned("approved", None, "q@bruss.example");
        store
            .commit_transition(1, &first, &HistoryEntry::archive(&doc, "q@bruss.example"))
            .await
            .unwrap();

        let second = doc.transitioned("rejected", None, "r@bruss.example");
        let result = store
            .commit_transition(1, &second, &HistoryEntry::archive(&doc, "r@bruss.example"))
            .await;
        assert!(matches!(
            result,
            Err(StoreError::VersionConflict { expected: 1, found: 2, .. })
        ));

        let stored = store.find_one("deviations", doc.id).await.unwrap().unwrap();
        assert_eq!(stored.status(), "approved");
        assert_eq!(store.history("deviations", doc.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_commit_on_missing_document() {
        let store = MemoryStore::new();
        let doc = pending("a@bruss.example");
        let next = doc.transitioned("approved", None, "q@bruss.example");
        let result = store
            .commit_transition(1, &next, &HistoryEntry::archive(&doc, "q@bruss.example"))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(store.history("deviations", doc.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_applies_filter_and_visibility() {
        let store = MemoryStore::new();
        store.insert(&pending("a@bruss.example")).await.unwrap();
        store
            .insert(&Document::new("deviations", "draft", "a@bruss.example", json!({})))
            .await
            .unwrap();

        let seen_by_owner = store
            .find("deviations", &ListFilter::default(), "a@bruss.example")
            .await
            .unwrap();
        assert_eq!(seen_by_owner.len(), 2);

        let seen_by_other = store
            .find("deviations", &ListFilter::default(), "b@bruss.example")
            .await
            .unwrap();
        assert_eq!(seen_by_other.len(), 1);
        assert_eq!(seen_by_other[0].status(), "pending");
    }
}
