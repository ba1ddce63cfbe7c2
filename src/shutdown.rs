use anyhow::Result;
use std::sync::Arc;
#[cfg(feature = "database")]
use std::time::Duration;
#[cfg(feature = "database")]
use tokio::time::timeout;
use tracing::{info, warn};

use crate::observability::WorkflowMetrics;
#[cfg(feature = "database")]
use crate::store::SqliteStore;

/// Graceful shutdown coordinator for Next BRUSS
#[derive(Default)]
pub struct ShutdownCoordinator {
    metrics: Option<Arc<WorkflowMetrics>>,
    #[cfg(feature = "database")]
    database: Option<SqliteStore>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(mut self, metrics: Arc<WorkflowMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[cfg(feature = "database")]
    pub fn with_database(mut self, database: SqliteStore) -> Self {
        self.database = Some(database);
        self
    }

    /// Resolves on SIGINT, or SIGTERM on unix
    pub async fn wait_for_signal() {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received SIGINT"),
            _ = terminate => info!("Received SIGTERM"),
        }
    }

    /// Perform graceful shutdown operations once the server has stopped accepting requests
    pub async fn shutdown_all_services(self) -> Result<()> {
        info!("Initiating graceful shutdown of all services...");

        if let Some(metrics) = &self.metrics {
            metrics.log_stats();
        }

        #[cfg(feature = "database")]
        if let Some(database) = &self.database {
            timeout(Duration::from_secs(10), database.shutdown())
                .await
                .map_err(|_| anyhow::anyhow!("Timeout waiting for database pool to close"))?;
        }

        info!("Graceful shutdown completed successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_without_services() {
        let coordinator = ShutdownCoordinator::new().with_metrics(Arc::new(WorkflowMetrics::new()));
        tokio_test::assert_ok!(coordinator.shutdown_all_services().await);
    }

    #[cfg(feature = "database")]
    #[tokio::test]
    async fn test_shutdown_closes_database_pool() {
        let database = SqliteStore::connect("sqlite::memory:", 1, true).await.unwrap();
        let coordinator = ShutdownCoordinator::new().with_database(database.clone());
        tokio_test::assert_ok!(coordinator.shutdown_all_services().await);
        assert!(database.is_closed());
    }
}
