use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Workflow and read-cache counters
#[derive(Debug, Default)]
pub struct WorkflowMetrics {
    pub documents_created: AtomicU64,
    pub transitions_accepted: AtomicU64,
    pub rejected_unauthorized: AtomicU64,
    pub rejected_invalid: AtomicU64,
    pub conflicts: AtomicU64,
    pub store_errors: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
    pub cache_invalidations: AtomicU64,
}

impl WorkflowMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&self) {
        self.documents_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_accepted(&self) {
        self.transitions_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Bucket a failed action by its error label
    pub fn record_rejection(&self, label: &str) {
        let counter = match label {
            "unauthorized" => &self.rejected_unauthorized,
            "conflict" => &self.conflicts,
            "error" => &self.store_errors,
            _ => &self.rejected_invalid,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation(&self) {
        self.cache_invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> WorkflowStats {
        WorkflowStats {
            documents_created: self.documents_created.load(Ordering::Relaxed),
            transitions_accepted: self.transitions_accepted.load(Ordering::Relaxed),
            rejected_unauthorized: self.rejected_unauthorized.load(Ordering::Relaxed),
            rejected_invalid: self.rejected_invalid.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_invalidations: self.cache_invalidations.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            created = stats.documents_created,
            accepted = stats.transitions_accepted,
            unauthorized = stats.rejected_unauthorized,
            invalid = stats.rejected_invalid,
            conflicts = stats.conflicts,
            store_errors = stats.store_errors,
            cache_hits = stats.cache_hits,
            cache_misses = stats.cache_misses,
            cache_invalidations = stats.cache_invalidations,
            "Workflow metrics"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowStats {
    pub documents_created: u64,
    pub transitions_accepted: u64,
    pub rejected_unauthorized: u64,
    pub rejected_invalid: u64,
    pub conflicts: u64,
    pub store_errors: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_invalidations: u64,
}

/// Time an operation and log its duration when finished
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis() as u64,
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_are_bucketed_by_label() {
        let metrics = WorkflowMetrics::new();
        metrics.record_rejection("unauthorized");
        metrics.record_rejection("invalid transition");
        metrics.record_rejection("invalid status");
        metrics.record_rejection("conflict");
        metrics.record_rejection("error");

        let stats = metrics.get_stats();
        assert_eq!(stats.rejected_unauthorized, 1);
        assert_eq!(stats.rejected_invalid, 2);
        assert_eq!(stats.conflicts, 1);
        assert_eq!(stats.store_errors, 1);
    }
}
