use async_trait::async_trait;
use chrono::SecondsFormat;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{migrate::MigrateDatabase, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::document::{history_collection, Document, HistoryEntry, DRAFT_STATUS};
use super::filter::ListFilter;
use super::{DocumentStore, StoreError};

/// SQLite-backed document store
///
/// Documents and history entries are kept as JSON bodies next to the columns
/// the list queries filter on.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (and create if missing) the database, optionally running migrations
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        auto_migrate: bool,
    ) -> Result<Self, StoreError> {
        if !sqlx::Sqlite::database_exists(database_url).await? {
            info!("Creating database at {}", database_url);
            sqlx::Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        if auto_migrate {
            info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations completed");
        }

        Ok(Self { pool })
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Close database connections gracefully
    pub async fn shutdown(&self) {
        if self.is_closed() {
            return;
        }
        info!("Shutting down database connections...");
        self.pool.close().await;
        info!("Database connections closed");
    }
}

fn timestamp(at: &chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn insert(&self, document: &Document) -> Result<(), StoreError> {
        let body = serde_json::to_string(document)?;
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO documents (id, collection, status, owner, version, created_at, body)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(document.id.to_string())
        .bind(document.collection())
        .bind(document.status())
        .bind(document.owner())
        .bind(document.version() as i64)
        .bind(timestamp(&document.body.created_at))
        .bind(body)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Duplicate(document.id));
        }
        Ok(())
    }

    async fn find_one(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT body FROM documents
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(collection)
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let body: String = row.get("body");
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    async fn find(
        &self,
        collection: &str,
        filter: &ListFilter,
        viewer: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT body FROM documents
            WHERE collection = ?1
              AND (?2 IS NULL OR status = ?2)
              AND (?3 IS NULL OR owner = ?3)
              AND (status != ?4 OR owner = ?5)
            ORDER BY created_at DESC
            "#,
        )
        .bind(collection)
        .bind(filter.status.as_deref())
        .bind(filter.owner.as_deref())
        .bind(DRAFT_STATUS)
        .bind(viewer)
        .fetch_all(&self.pool)
        .await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let body: String = row.get("body");
            let document: Document = serde_json::from_str(&body)?;
            // Date bounds are checked on the decoded timestamps
            if filter.matches(&document, viewer) {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    async fn commit_transition(
        &self,
        expected_version: u64,
        updated: &Document,
        history: &HistoryEntry,
    ) -> Result<(), StoreError> {
        let body = serde_json::to_string(updated)?;
        let history_body = serde_json::to_string(history)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET status = ?1, version = ?2, body = ?3
            WHERE collection = ?4 AND id = ?5 AND version = ?6
            "#,
        )
        .bind(updated.status())
        .bind(updated.version() as i64)
        .bind(body)
        .bind(updated.collection())
        .bind(updated.id.to_string())
        .bind(expected_version as i64)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let found = sqlx::query("SELECT version FROM documents WHERE collection = ?1 AND id = ?2")
                .bind(updated.collection())
                .bind(updated.id.to_string())
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await?;

            return Err(match found {
                Some(row) => StoreError::VersionConflict {
                    id: updated.id,
                    expected: expected_version,
                    found: row.get::<i64, _>("version") as u64,
                },
                None => StoreError::NotFound {
                    collection: updated.collection().to_string(),
                    id: updated.id,
                },
            });
        }

        sqlx::query(
            r#"
            INSERT INTO document_history (entity_id, history_collection, archived_at, body)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(history.entity_id.to_string())
        .bind(history_collection(history.collection()))
        .bind(timestamp(&history.archived_at))
        .bind(history_body)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn history(&self, collection: &str, id: Uuid) -> Result<Vec<HistoryEntry>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT body FROM document_history
            WHERE history_collection = ?1 AND entity_id = ?2
            ORDER BY seq DESC
            "#,
        )
        .bind(history_collection(collection))
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let body: String = row.get("body");
                serde_json::from_str(&body).map_err(StoreError::from)
            })
            .collect()
    }
}
