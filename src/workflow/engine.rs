use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::auth::Session;
use crate::cache::TaggedCache;
use crate::entities::EntityKind;
use crate::observability::{OperationTimer, WorkflowMetrics};
use crate::store::{Document, DocumentStore, HistoryEntry, ListFilter, StoreError};
use crate::telemetry::{create_workflow_span, generate_correlation_id};

use super::errors::WorkflowError;

/// Entry point for every workflow action
///
/// Owns the document store and the list cache. All writes go through
/// [`WorkflowEngine::create`] or [`WorkflowEngine::transition`], which
/// invalidate the collection's cache tag once the store has committed.
pub struct WorkflowEngine {
    store: Arc<dyn DocumentStore>,
    lists: TaggedCache<Arc<Vec<Document>>>,
    metrics: Arc<WorkflowMetrics>,
}

impl WorkflowEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        cache_capacity: u64,
        cache_ttl: Duration,
        metrics: Arc<WorkflowMetrics>,
    ) -> Self {
        let lists = TaggedCache::new(cache_capacity, cache_ttl, metrics.clone());
        Self {
            store,
            lists,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<WorkflowMetrics> {
        &self.metrics
    }

    /// Create a record in the entity's initial status, owned by `actor`
    pub async fn create(
        &self,
        kind: EntityKind,
        actor: &Session,
        payload: Value,
    ) -> Result<Document, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span = create_workflow_span("create", kind.collection(), &actor.email, &correlation_id);

        async {
            let result = self.insert_new(kind, actor, payload).await;

            match &result {
                Ok(document) => {
                    self.metrics.record_created();
                    info!(id = %document.id, status = document.status(), "Document created");
                }
                Err(e) => self.record_failure(e),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn insert_new(
        &self,
        kind: EntityKind,
        actor: &Session,
        payload: Value,
    ) -> Result<Document, WorkflowError> {
        let payload = kind.validate_payload(payload)?;
        let document = Document::new(
            kind.collection(),
            kind.initial_status(),
            &actor.email,
            payload,
        );
        self.store.insert(&document).await?;
        self.lists.invalidate_tag(kind.collection()).await;
        Ok(document)
    }

    /// Read one record; drafts are only visible to their owner
    pub async fn get(
        &self,
        kind: EntityKind,
        id: Uuid,
        actor: &Session,
    ) -> Result<Document, WorkflowError> {
        self.store
            .find_one(kind.collection(), id)
            .await?
            .filter(|document| document.is_visible_to(&actor.email))
            .ok_or_else(|| WorkflowError::NotFound {
                collection: kind.collection().to_string(),
                id,
            })
    }

    /// List records matching `filter`, served from the cache when possible
    pub async fn list(
        &self,
        kind: EntityKind,
        filter: &ListFilter,
        actor: &Session,
    ) -> Result<Arc<Vec<Document>>, WorkflowError> {
        let tag = kind.collection();
        let query = filter.cache_key();

        if let Some(cached) = self.lists.get(tag, &actor.email, &query).await {
            return Ok(cached);
        }

        let generation = self.lists.generation(tag).await;
        let documents = Arc::new(self.store.find(tag, filter, &actor.email).await?);
        self.lists
            .insert(tag, &actor.email, &query, generation, documents.clone())
            .await;
        Ok(documents)
    }

    /// Archived versions of a record, newest first
    pub async fn history(
        &self,
        kind: EntityKind,
        id: Uuid,
        actor: &Session,
    ) -> Result<Vec<HistoryEntry>, WorkflowError> {
        self.get(kind, id, actor).await?;
        Ok(self.store.history(kind.collection(), id).await?)
    }

    /// Move a record to `requested`, archiving its previous version.
    ///
    /// Nothing is written unless the guard accepts the transition and the
    /// record has not changed since it was read.
    pub async fn transition(
        &self,
        kind: EntityKind,
        id: Uuid,
        requested: &str,
        actor: &Session,
    ) -> Result<Document, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span =
            create_workflow_span("transition", kind.collection(), &actor.email, &correlation_id);

        async {
            let timer = OperationTimer::new("workflow_transition");
            let result = self.apply_transition(kind, id, requested, actor).await;

            match &result {
                Ok(document) => {
                    self.metrics.record_accepted();
                    info!(
                        id = %id,
                        status = document.status(),
                        version = document.version(),
                        "Transition accepted"
                    );
                }
                Err(e) => self.record_failure(e),
            }
            timer.finish();
            result
        }
        .instrument(span)
        .await
    }

    async fn apply_transition(
        &self,
        kind: EntityKind,
        id: Uuid,
        requested: &str,
        actor: &Session,
    ) -> Result<Document, WorkflowError> {
        let current = self.get(kind, id, actor).await?;
        let resolved = kind.resolve_transition(&current, requested, actor)?;

        let next = current.transitioned(resolved.to, resolved.stamp, &actor.email);
        let archived = HistoryEntry::archive(&current, &actor.email);

        self.store
            .commit_transition(current.version(), &next, &archived)
            .await
            .map_err(|e| match e {
                StoreError::VersionConflict { .. } => WorkflowError::Conflict {
                    collection: kind.collection().to_string(),
                    id,
                },
                StoreError::NotFound { .. } => WorkflowError::NotFound {
                    collection: kind.collection().to_string(),
                    id,
                },
                other => WorkflowError::Store(other),
            })?;

        self.lists.invalidate_tag(kind.collection()).await;
        Ok(next)
    }

    fn record_failure(&self, e: &WorkflowError) {
        self.metrics.record_rejection(e.label());
        if e.is_rejection() {
            warn!(reason = e.label(), error = %e, "Workflow action rejected");
        } else {
            error!(error = %e, "Workflow action failed");
        }
    }
}
