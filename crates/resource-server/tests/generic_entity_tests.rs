//! A second entity type flowing through the same pipeline

mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use resource_server::gateway::PersistenceGateway;
use resource_server::services::ResourceService;
use resource_server::storage::{Database, MemoryStore, ResourceRepository};
use resource_server::{build_router, AppState};
use resource_types::Entity;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Student {
    #[serde(default)]
    id: u64,
    name: String,
    age: u32,
    score: u32,
    #[serde(default)]
    tags: Value,
    #[serde(default)]
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: DateTime<Utc>,
}

impl Entity for Student {
    const COLLECTION: &'static str = "students";

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn stamp(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
        self.created_at = created_at;
        self.updated_at = updated_at;
    }

    fn validate(&self) -> Result<(), String> {
        if self.score > 100 {
            return Err("score out of range".to_string());
        }
        Ok(())
    }
}

fn student_router(adapter: Arc<dyn ResourceRepository<Student>>) -> axum::Router {
    let gateway = Arc::new(PersistenceGateway::<Student>::new(adapter));
    let service = Arc::new(ResourceService::<Student>::new(gateway));
    build_router(AppState::<Student>::new(service))
}

async fn exercise(app: axum::Router) {
    let (status, body) = common::call(
        &app,
        "POST",
        "/api/v1/students",
        Some(json!({"name": "Jjanggu", "age": 5, "score": 100, "tags": {"class": "sunflower"}})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Student = common::data(body);
    assert_eq!(created.id, 1);
    assert_eq!(created.tags["class"], "sunflower");

    let (status, body) = common::call(
        &app,
        "PUT",
        "/api/v1/students/1",
        Some(json!({"name": "Jjanggu", "age": 6, "score": 90})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: Student = common::data(body);
    assert_eq!(updated.age, 6);
    assert_eq!(updated.created_at, created.created_at);

    let (status, body) = common::call(
        &app,
        "POST",
        "/api/v1/students",
        Some(json!({"name": "Maenggu", "age": 5, "score": 101})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid request data");

    let (_, body) = common::call(&app, "GET", "/api/v1/students/1", None).await;
    assert_eq!(common::data::<Student>(body), updated);

    // Only the student collection is routed
    let (status, body) = common::call(&app, "GET", "/api/v1/resources", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn students_in_memory() {
    exercise(student_router(Arc::new(MemoryStore::<Student>::new()))).await;
}

#[tokio::test]
async fn students_in_sqlite() {
    let db = Database::in_memory().await.unwrap();
    let adapter = db.adapter::<Student>().await.unwrap();
    exercise(student_router(Arc::new(adapter))).await;
}
