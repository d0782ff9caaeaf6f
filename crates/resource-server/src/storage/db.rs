//! SQLite storage adapter (embedded, no external dependencies)

use super::ResourceRepository;
use crate::context::RequestContext;
use crate::error::{StoreError, StoreResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use resource_types::Entity;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    pub async fn new(database_path: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        // Create parent directory if needed
        let parent = std::path::Path::new(database_path)
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Invalid database path: no parent directory"))?;
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        tracing::info!("SQLite connection established");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Private in-memory database. A single connection that never expires
    /// keeps every query on the same database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory SQLite database")?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Run the inline migration for `E` and hand out its adapter
    pub async fn adapter<E: Entity>(&self) -> Result<SqliteAdapter<E>> {
        Self::run_migrations(&self.pool, E::COLLECTION)
            .await
            .with_context(|| format!("Failed to migrate collection {}", E::COLLECTION))?;

        Ok(SqliteAdapter {
            pool: self.pool.clone(),
            table: E::COLLECTION,
            _entity: PhantomData,
        })
    }

    async fn run_migrations(pool: &SqlitePool, table: &str) -> Result<()> {
        // AUTOINCREMENT keeps deleted ids from being handed out again
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                payload TEXT NOT NULL,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#
        ))
        .execute(pool)
        .await?;

        Ok(())
    }
}

/// Stores any [`Entity`] as a JSON payload next to its id and timestamps.
pub struct SqliteAdapter<E> {
    pool: Arc<SqlitePool>,
    table: &'static str,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> SqliteAdapter<E> {
    async fn insert_row(&self, mut entity: E) -> StoreResult<E> {
        let now = Utc::now();
        entity.set_id(0);
        entity.stamp(now, now);
        let payload = serde_json::to_string(&entity)?;

        let result = sqlx::query(&format!(
            "INSERT INTO {} (name, payload, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
            self.table
        ))
        .bind(entity.name())
        .bind(payload)
        .bind(now)
        .bind(now)
        .execute(&*self.pool)
        .await?;

        entity.set_id(to_id(result.last_insert_rowid())?);
        Ok(entity)
    }

    async fn fetch_row(&self, id: u64) -> StoreResult<E> {
        let row: Option<RecordRow> = sqlx::query_as(&format!(
            "SELECT id, payload, created_at, updated_at FROM {} WHERE id = ?1",
            self.table
        ))
        .bind(to_key(id)?)
        .fetch_optional(&*self.pool)
        .await?;

        row.ok_or(StoreError::NotFound(id))?.decode()
    }

    async fn fetch_all(&self) -> StoreResult<Vec<E>> {
        let rows: Vec<RecordRow> = sqlx::query_as(&format!(
            "SELECT id, payload, created_at, updated_at FROM {} ORDER BY id",
            self.table
        ))
        .fetch_all(&*self.pool)
        .await?;

        rows.into_iter().map(RecordRow::decode).collect()
    }

    async fn update_row(&self, mut entity: E) -> StoreResult<E> {
        let id = entity.id();
        let key = to_key(id)?;
        let mut tx = self.pool.begin().await?;

        let created_at: Option<DateTime<Utc>> = sqlx::query_scalar(&format!(
            "SELECT created_at FROM {} WHERE id = ?1",
            self.table
        ))
        .bind(key)
        .fetch_optional(&mut *tx)
        .await?;
        let created_at = created_at.ok_or(StoreError::NotFound(id))?;

        let updated_at = Utc::now().max(created_at);
        entity.stamp(created_at, updated_at);
        let payload = serde_json::to_string(&entity)?;

        sqlx::query(&format!(
            "UPDATE {} SET name = ?1, payload = ?2, updated_at = ?3 WHERE id = ?4",
            self.table
        ))
        .bind(entity.name())
        .bind(payload)
        .bind(updated_at)
        .bind(key)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(entity)
    }

    async fn delete_row(&self, id: u64) -> StoreResult<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?1", self.table))
            .bind(to_key(id)?)
            .execute(&*self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> ResourceRepository<E> for SqliteAdapter<E> {
    async fn create(&self, ctx: &RequestContext, entity: E) -> StoreResult<E> {
        ctx.run(self.insert_row(entity)).await?
    }

    async fn get(&self, ctx: &RequestContext, id: u64) -> StoreResult<E> {
        ctx.run(self.fetch_row(id)).await?
    }

    async fn list(&self, ctx: &RequestContext) -> StoreResult<Vec<E>> {
        ctx.run(self.fetch_all()).await?
    }

    async fn update(&self, ctx: &RequestContext, entity: E) -> StoreResult<E> {
        ctx.run(self.update_row(entity)).await?
    }

    async fn delete(&self, ctx: &RequestContext, id: u64) -> StoreResult<()> {
        ctx.run(self.delete_row(id)).await?
    }
}

// Helper struct for sqlx query_as
#[derive(sqlx::FromRow)]
struct RecordRow {
    id: i64,
    payload: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RecordRow {
    /// Columns are authoritative for id and timestamps
    fn decode<E: Entity>(self) -> StoreResult<E> {
        let mut entity: E = serde_json::from_str(&self.payload)?;
        entity.set_id(to_id(self.id)?);
        entity.stamp(self.created_at, self.updated_at);
        Ok(entity)
    }
}

fn to_id(rowid: i64) -> StoreResult<u64> {
    u64::try_from(rowid).map_err(|_| StoreError::Persistence(format!("negative row id {}", rowid)))
}

fn to_key(id: u64) -> StoreResult<i64> {
    i64::try_from(id).map_err(|_| StoreError::NotFound(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_types::Resource;

    async fn adapter() -> SqliteAdapter<Resource> {
        let db = Database::in_memory().await.unwrap();
        db.adapter::<Resource>().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let adapter = adapter().await;
        let ctx = RequestContext::background();

        let mut payload = Resource::new("alpha");
        payload.id = 99;
        let created = adapter.create(&ctx, payload).await.unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = adapter.get(&ctx, created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let adapter = adapter().await;
        let result = adapter.get(&RequestContext::background(), 5).await;
        assert!(matches!(result, Err(StoreError::NotFound(5))));
    }

    #[tokio::test]
    async fn test_update_preserves_created_at() {
        let adapter = adapter().await;
        let ctx = RequestContext::background();
        let created = adapter.create(&ctx, Resource::new("before")).await.unwrap();

        let mut changed = created.clone();
        changed.name = "after".to_string();
        let updated = adapter.update(&ctx, changed).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= updated.created_at);
        assert_eq!(adapter.get(&ctx, created.id).await.unwrap().name, "after");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_rows() {
        let adapter = adapter().await;
        let ctx = RequestContext::background();

        let mut ghost = Resource::new("ghost");
        ghost.id = 3;
        assert!(matches!(
            adapter.update(&ctx, ghost).await,
            Err(StoreError::NotFound(3))
        ));
        assert!(matches!(
            adapter.delete(&ctx, 3).await,
            Err(StoreError::NotFound(3))
        ));
    }

    #[tokio::test]
    async fn test_deleted_ids_are_not_reused() {
        let adapter = adapter().await;
        let ctx = RequestContext::background();

        let first = adapter.create(&ctx, Resource::new("a")).await.unwrap();
        adapter.delete(&ctx, first.id).await.unwrap();
        let second = adapter.create(&ctx, Resource::new("b")).await.unwrap();

        assert!(second.id > first.id);
        let all = adapter.list(&ctx).await.unwrap();
        assert_eq!(all, vec![second]);
    }

    #[tokio::test]
    async fn test_cancelled_context_skips_write() {
        let adapter = adapter().await;
        let ctx = RequestContext::background();
        ctx.cancel();

        let result = adapter.create(&ctx, Resource::new("never")).await;
        assert!(matches!(result, Err(StoreError::Cancelled)));

        let all = adapter.list(&RequestContext::background()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("resources.db");
        let db = Database::new(path.to_str().unwrap()).await.unwrap();
        let adapter = db.adapter::<Resource>().await.unwrap();

        let created = adapter
            .create(&RequestContext::background(), Resource::new("on disk"))
            .await
            .unwrap();
        assert_eq!(created.id, 1);
        assert!(path.exists());
    }
}
