//! Persistence gateway
//!
//! Pass-through in front of a storage adapter. Business rules depend on the
//! [`ResourceRepository`] trait; the gateway is what production wiring hands
//! them, so the adapter behind it can change without touching the service.

use crate::context::RequestContext;
use crate::error::StoreResult;
use crate::storage::ResourceRepository;
use async_trait::async_trait;
use resource_types::Entity;
use std::sync::Arc;
use tracing::debug;

pub struct PersistenceGateway<E: Entity> {
    adapter: Arc<dyn ResourceRepository<E>>,
}

impl<E: Entity> PersistenceGateway<E> {
    pub fn new(adapter: Arc<dyn ResourceRepository<E>>) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl<E: Entity> ResourceRepository<E> for PersistenceGateway<E> {
    async fn create(&self, ctx: &RequestContext, entity: E) -> StoreResult<E> {
        debug!("gateway: create {}", E::COLLECTION);
        self.adapter.create(ctx, entity).await
    }

    async fn get(&self, ctx: &RequestContext, id: u64) -> StoreResult<E> {
        debug!("gateway: get {} {}", E::COLLECTION, id);
        self.adapter.get(ctx, id).await
    }

    async fn list(&self, ctx: &RequestContext) -> StoreResult<Vec<E>> {
        debug!("gateway: list {}", E::COLLECTION);
        self.adapter.list(ctx).await
    }

    async fn update(&self, ctx: &RequestContext, entity: E) -> StoreResult<E> {
        debug!("gateway: update {} {}", E::COLLECTION, entity.id());
        self.adapter.update(ctx, entity).await
    }

    async fn delete(&self, ctx: &RequestContext, id: u64) -> StoreResult<()> {
        debug!("gateway: delete {} {}", E::COLLECTION, id);
        self.adapter.delete(ctx, id).await
    }
}
