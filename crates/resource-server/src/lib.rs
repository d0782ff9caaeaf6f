//! Resource Server
//!
//! Serves a generic resource through a layered pipeline:
//! handlers → [`services::ResourceService`] → [`gateway::PersistenceGateway`]
//! → a storage adapter (SQLite or the in-memory [`storage::MemoryStore`]).

pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod services;
pub mod storage;

use axum::{routing::get, Router};
use context::RequestContext;
use resource_types::Entity;
use services::ResourceUseCase;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
pub struct AppState<E: Entity> {
    pub resources: Arc<dyn ResourceUseCase<E>>,
    /// Cancelled on shutdown; every request context hangs off it
    pub shutdown: CancellationToken,
    pub request_timeout: Option<Duration>,
}

impl<E: Entity> AppState<E> {
    pub fn new(resources: Arc<dyn ResourceUseCase<E>>) -> Self {
        Self {
            resources,
            shutdown: CancellationToken::new(),
            request_timeout: None,
        }
    }

    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Fresh context for one request
    pub fn request_context(&self) -> RequestContext {
        RequestContext::new(self.shutdown.child_token(), self.request_timeout)
    }
}

impl<E: Entity> Clone for AppState<E> {
    fn clone(&self) -> Self {
        Self {
            resources: self.resources.clone(),
            shutdown: self.shutdown.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

/// Build the full HTTP router for entity `E`
pub fn build_router<E: Entity>(state: AppState<E>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // REST API routes
        .nest("/api/v1", api_routes::<E>())
        // Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes<E: Entity>() -> Router<AppState<E>> {
    use handlers::resources;

    let collection = format!("/{}", E::COLLECTION);
    let item = format!("/{}/:id", E::COLLECTION);

    Router::new()
        .route(
            &collection,
            get(resources::list::<E>).post(resources::create::<E>),
        )
        .route(
            &item,
            get(resources::get::<E>)
                .put(resources::update::<E>)
                .delete(resources::delete::<E>),
        )
}
