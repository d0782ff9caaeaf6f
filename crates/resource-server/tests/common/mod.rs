#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use resource_server::gateway::PersistenceGateway;
use resource_server::services::ResourceService;
use resource_server::storage::{Database, MemoryStore, ResourceRepository};
use resource_server::{build_router, AppState};
use resource_types::{ApiResponse, Resource};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Production wiring over an arbitrary adapter
pub fn router_over(adapter: Arc<dyn ResourceRepository<Resource>>) -> Router {
    let gateway = Arc::new(PersistenceGateway::<Resource>::new(adapter));
    let service = Arc::new(ResourceService::<Resource>::new(gateway));
    build_router(AppState::<Resource>::new(service))
}

pub fn memory_app() -> (Router, Arc<MemoryStore<Resource>>) {
    let store = Arc::new(MemoryStore::<Resource>::new());
    (router_over(store.clone()), store)
}

pub async fn sqlite_app() -> Router {
    let db = Database::in_memory().await.unwrap();
    let adapter = db.adapter::<Resource>().await.unwrap();
    router_over(Arc::new(adapter))
}

/// Send one request; an empty response body comes back as `Value::Null`
pub async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Decode the envelope's data field
pub fn data<T: DeserializeOwned>(body: Value) -> T {
    let envelope: ApiResponse<T> = serde_json::from_value(body).unwrap();
    envelope.data.expect("envelope without data")
}

pub fn names(items: &[Resource]) -> Vec<&str> {
    items.iter().map(|r| r.name.as_str()).collect()
}
