use moka::future::Cache;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::observability::WorkflowMetrics;

/// Read cache whose entries are grouped by tag
///
/// Keys have the shape `<tag>|<viewer>|<query>`. A write to an entity type
/// invalidates its tag so the next read goes back to the store.
///
/// Each tag carries a generation bumped on invalidation. A reader takes the
/// generation before querying the store and only caches its result if no
/// invalidation happened in between.
#[derive(Clone)]
pub struct TaggedCache<V: Clone + Send + Sync + 'static> {
    cache: Cache<String, V>,
    generations: Arc<RwLock<HashMap<String, u64>>>,
    metrics: Arc<WorkflowMetrics>,
}

impl<V: Clone + Send + Sync + 'static> TaggedCache<V> {
    pub fn new(max_capacity: u64, ttl: Duration, metrics: Arc<WorkflowMetrics>) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self {
            cache,
            generations: Arc::new(RwLock::new(HashMap::new())),
            metrics,
        }
    }

    fn key(tag: &str, viewer: &str, query: &str) -> String {
        format!("{tag}|{viewer}|{query}")
    }

    pub async fn get(&self, tag: &str, viewer: &str, query: &str) -> Option<V> {
        let value = self.cache.get(&Self::key(tag, viewer, query)).await;
        match value {
            Some(_) => self.metrics.record_cache_hit(),
            None => self.metrics.record_cache_miss(),
        }
        value
    }

    /// Current generation of `tag`, to be taken before reading the store
    pub async fn generation(&self, tag: &str) -> u64 {
        self.generations.read().await.get(tag).copied().unwrap_or(0)
    }

    /// Store `value` unless `tag` was invalidated since `generation` was taken.
    ///
    /// Returns whether the value was cached.
    pub async fn insert(
        &self,
        tag: &str,
        viewer: &str,
        query: &str,
        generation: u64,
        value: V,
    ) -> bool {
        // held across the insert so an invalidation cannot slip in between
        let generations = self.generations.read().await;
        if generations.get(tag).copied().unwrap_or(0) != generation {
            debug!(tag = tag, "Skipping cache fill from a superseded read");
            return false;
        }
        self.cache.insert(Self::key(tag, viewer, query), value).await;
        true
    }

    /// Drop every entry carrying `tag` and retire reads started before now
    pub async fn invalidate_tag(&self, tag: &str) {
        let mut generations = self.generations.write().await;
        *generations.entry(tag.to_string()).or_insert(0) += 1;

        let prefix = format!("{tag}|");
        let keys_to_remove: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        let removed = keys_to_remove.len();
        for key in keys_to_remove {
            self.cache.invalidate(&key).await;
        }

        drop(generations);

        self.metrics.record_invalidation();
        debug!(tag = tag, removed = removed, "Invalidated cache tag");
    }
}
