//! Resource business rules

use crate::context::RequestContext;
use crate::error::{Operation, ServiceError, ServiceResult};
use crate::storage::ResourceRepository;
use async_trait::async_trait;
use resource_types::Entity;
use std::sync::Arc;
use tracing::info;

/// Business-rule boundary the HTTP handlers talk to
#[async_trait]
pub trait ResourceUseCase<E: Entity>: Send + Sync {
    async fn create(&self, ctx: &RequestContext, entity: E) -> ServiceResult<E>;

    async fn get(&self, ctx: &RequestContext, id: u64) -> ServiceResult<E>;

    async fn list(&self, ctx: &RequestContext) -> ServiceResult<Vec<E>>;

    async fn update(&self, ctx: &RequestContext, id: u64, entity: E) -> ServiceResult<E>;

    async fn delete(&self, ctx: &RequestContext, id: u64) -> ServiceResult<()>;
}

/// Stateless service enforcing existence-before-mutate on top of a repository.
pub struct ResourceService<E: Entity> {
    repo: Arc<dyn ResourceRepository<E>>,
}

impl<E: Entity> ResourceService<E> {
    pub fn new(repo: Arc<dyn ResourceRepository<E>>) -> Self {
        Self { repo }
    }

    async fn ensure_exists(&self, ctx: &RequestContext, op: Operation, id: u64) -> ServiceResult<()> {
        self.repo
            .get(ctx, id)
            .await
            .map(|_| ())
            .map_err(|e| ServiceError::wrap(op, e))
    }
}

fn validate<E: Entity>(op: Operation, entity: &E) -> ServiceResult<()> {
    entity
        .validate()
        .map_err(|reason| ServiceError::Invalid { op, reason })
}

#[async_trait]
impl<E: Entity> ResourceUseCase<E> for ResourceService<E> {
    async fn create(&self, ctx: &RequestContext, entity: E) -> ServiceResult<E> {
        validate(Operation::Create, &entity)?;

        let created = self
            .repo
            .create(ctx, entity)
            .await
            .map_err(|e| ServiceError::wrap(Operation::Create, e))?;

        info!("Created {} {}", E::COLLECTION, created.id());
        Ok(created)
    }

    async fn get(&self, ctx: &RequestContext, id: u64) -> ServiceResult<E> {
        self.repo
            .get(ctx, id)
            .await
            .map_err(|e| ServiceError::wrap(Operation::Get, e))
    }

    async fn list(&self, ctx: &RequestContext) -> ServiceResult<Vec<E>> {
        self.repo
            .list(ctx)
            .await
            .map_err(|e| ServiceError::wrap(Operation::List, e))
    }

    async fn update(&self, ctx: &RequestContext, id: u64, mut entity: E) -> ServiceResult<E> {
        validate(Operation::Update, &entity)?;
        self.ensure_exists(ctx, Operation::Update, id).await?;

        // The path id wins over whatever the payload carried
        entity.set_id(id);
        let updated = self
            .repo
            .update(ctx, entity)
            .await
            .map_err(|e| ServiceError::wrap(Operation::Update, e))?;

        info!("Updated {} {}", E::COLLECTION, id);
        Ok(updated)
    }

    async fn delete(&self, ctx: &RequestContext, id: u64) -> ServiceResult<()> {
        self.ensure_exists(ctx, Operation::Delete, id).await?;

        self.repo
            .delete(ctx, id)
            .await
            .map_err(|e| ServiceError::wrap(Operation::Delete, e))?;

        info!("Deleted {} {}", E::COLLECTION, id);
        Ok(())
    }
}
