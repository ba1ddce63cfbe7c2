// Next BRUSS Library - shared status workflow for plant records
// This exposes the core components for the server binary and for testing

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod entities;
pub mod observability;
pub mod shutdown;
pub mod store;
pub mod telemetry;
pub mod workflow;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

// Re-export key types for easy access
pub use api::{router, ActionResponse, AppState};
pub use auth::{RoleSet, Session, SessionStore};
pub use config::NextBrussConfig;
pub use entities::EntityKind;
pub use observability::{OperationTimer, WorkflowMetrics};
pub use shutdown::ShutdownCoordinator;
pub use store::{Document, DocumentStore, HistoryEntry, ListFilter, MemoryStore, StoreError};
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use workflow::{WorkflowEngine, WorkflowError};

/// Session store seeded with the configured static sessions
pub async fn build_session_store(config: &config::AuthConfig) -> Result<SessionStore> {
    let sessions = SessionStore::new(
        config.max_sessions,
        Duration::from_secs(config.session_idle_minutes * 60),
    );
    for seeded in &config.static_sessions {
        let session = Session::new(&seeded.email, RoleSet::new(&seeded.roles))?;
        sessions.insert(&seeded.token, session).await;
    }
    if !config.static_sessions.is_empty() {
        tracing::warn!(
            count = config.static_sessions.len(),
            "Static sessions configured; do not use in production"
        );
    }
    Ok(sessions)
}

/// Engine over `store` with the configured cache settings
pub fn build_engine(
    store: Arc<dyn DocumentStore>,
    config: &NextBrussConfig,
    metrics: Arc<WorkflowMetrics>,
) -> Arc<WorkflowEngine> {
    Arc::new(WorkflowEngine::new(
        store,
        config.cache.max_capacity,
        Duration::from_secs(config.cache.ttl_seconds),
        metrics,
    ))
}
