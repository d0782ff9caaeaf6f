//! Storage layer
//!
//! Uses SQLite (embedded) through sqlx for the persisted variant and a
//! lock-guarded map for the in-memory variant. Both implement
//! [`ResourceRepository`].

pub mod db;
pub mod memory;

pub use db::{Database, SqliteAdapter};
pub use memory::MemoryStore;

use crate::context::RequestContext;
use crate::error::StoreResult;
use async_trait::async_trait;
use resource_types::Entity;

/// Raw persistence contract shared by adapters and the persistence gateway.
///
/// Implementations assign ids and timestamps; they enforce no business rules.
#[async_trait]
pub trait ResourceRepository<E: Entity>: Send + Sync {
    /// Persist a new record and return it with its assigned id and timestamps
    async fn create(&self, ctx: &RequestContext, entity: E) -> StoreResult<E>;

    async fn get(&self, ctx: &RequestContext, id: u64) -> StoreResult<E>;

    async fn list(&self, ctx: &RequestContext) -> StoreResult<Vec<E>>;

    /// Overwrite the record with `entity.id()`; `created_at` is preserved
    async fn update(&self, ctx: &RequestContext, entity: E) -> StoreResult<E>;

    async fn delete(&self, ctx: &RequestContext, id: u64) -> StoreResult<()>;
}
