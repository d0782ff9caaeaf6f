//! In-memory concurrent store
//!
//! The record map and the id allocator sit behind a single `RwLock`, so an
//! allocation and its insert are one step and a listing never observes a
//! half-applied mutation.

use super::ResourceRepository;
use crate::context::RequestContext;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use resource_types::Entity;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

pub struct MemoryStore<E> {
    inner: RwLock<Inner<E>>,
}

struct Inner<E> {
    records: BTreeMap<u64, E>,
    last_id: u64,
}

impl<E: Entity> MemoryStore<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: BTreeMap::new(),
                last_id: 0,
            }),
        }
    }

    /// Store pre-loaded with `records` under their own ids. The allocator
    /// continues after the highest seeded id.
    pub fn with_records(records: impl IntoIterator<Item = E>) -> Self {
        let now = Utc::now();
        let records: BTreeMap<u64, E> = records
            .into_iter()
            .map(|mut record| {
                record.stamp(now, now);
                (record.id(), record)
            })
            .collect();
        let last_id = records.keys().next_back().copied().unwrap_or(0);

        Self {
            inner: RwLock::new(Inner { records, last_id }),
        }
    }

    /// Last id handed out by the allocator
    pub async fn last_id(&self) -> u64 {
        self.inner.read().await.last_id
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> ResourceRepository<E> for MemoryStore<E> {
    async fn create(&self, ctx: &RequestContext, mut entity: E) -> StoreResult<E> {
        let mut inner = ctx.run(self.inner.write()).await?;

        inner.last_id += 1;
        let id = inner.last_id;
        let now = Utc::now();
        entity.set_id(id);
        entity.stamp(now, now);
        inner.records.insert(id, entity.clone());

        tracing::debug!("Created {} record {}", E::COLLECTION, id);
        Ok(entity)
    }

    async fn get(&self, ctx: &RequestContext, id: u64) -> StoreResult<E> {
        let inner = ctx.run(self.inner.read()).await?;
        inner.records.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn list(&self, ctx: &RequestContext) -> StoreResult<Vec<E>> {
        let mut snapshot: Vec<E> = {
            let inner = ctx.run(self.inner.read()).await?;
            inner.records.values().cloned().collect()
        };

        // Stable sort on an id-ordered snapshot: equal names stay in id order
        snapshot.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(snapshot)
    }

    async fn update(&self, ctx: &RequestContext, mut entity: E) -> StoreResult<E> {
        let mut inner = ctx.run(self.inner.write()).await?;

        let id = entity.id();
        let slot = inner.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let created_at = slot.created_at();
        entity.stamp(created_at, Utc::now().max(created_at));
        *slot = entity.clone();

        tracing::debug!("Updated {} record {}", E::COLLECTION, id);
        Ok(entity)
    }

    async fn delete(&self, ctx: &RequestContext, id: u64) -> StoreResult<()> {
        let mut inner = ctx.run(self.inner.write()).await?;
        inner
            .records
            .remove(&id)
            .map(|_| tracing::debug!("Deleted {} record {}", E::COLLECTION, id))
            .ok_or(StoreError::NotFound(id))
    }
}
