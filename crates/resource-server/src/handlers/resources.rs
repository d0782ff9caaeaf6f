//! Resource handlers

use super::render;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use resource_types::{ApiResponse, Entity, SUCCESS_MESSAGE};
use serde::Serialize;

type Enveloped<T> = (StatusCode, Json<ApiResponse<T>>);

fn respond<T: Serialize>(status: StatusCode, data: T) -> Enveloped<T> {
    (status, Json(ApiResponse::success(status.as_u16(), data)))
}

fn parse_id(raw: &str) -> ApiResult<u64> {
    raw.parse::<u64>()
        .map_err(|_| ApiError::InvalidId(raw.to_string()))
}

fn parse_body<E: Entity>(payload: Result<Json<E>, JsonRejection>) -> ApiResult<E> {
    payload
        .map(|Json(entity)| entity)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|h| h.to_str().ok())
        .map(|accept| accept.contains("text/html"))
        .unwrap_or(false)
}

pub async fn list<E: Entity>(
    State(state): State<AppState<E>>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let ctx = state.request_context();
    let items = state.resources.list(&ctx).await?;

    if wants_html(&headers) {
        return Ok(Html(render::resource_table(&items)?).into_response());
    }
    Ok(respond(StatusCode::OK, items).into_response())
}

pub async fn get<E: Entity>(
    State(state): State<AppState<E>>,
    Path(id): Path<String>,
) -> ApiResult<Enveloped<E>> {
    let id = parse_id(&id)?;
    let ctx = state.request_context();

    let item = state.resources.get(&ctx, id).await?;
    Ok(respond(StatusCode::OK, item))
}

pub async fn create<E: Entity>(
    State(state): State<AppState<E>>,
    payload: Result<Json<E>, JsonRejection>,
) -> ApiResult<Enveloped<E>> {
    let entity = parse_body(payload)?;
    let ctx = state.request_context();

    let created = state.resources.create(&ctx, entity).await?;
    Ok(respond(StatusCode::CREATED, created))
}

pub async fn update<E: Entity>(
    State(state): State<AppState<E>>,
    Path(id): Path<String>,
    payload: Result<Json<E>, JsonRejection>,
) -> ApiResult<Enveloped<E>> {
    let id = parse_id(&id)?;
    let entity = parse_body(payload)?;
    let ctx = state.request_context();

    let updated = state.resources.update(&ctx, id, entity).await?;
    Ok(respond(StatusCode::OK, updated))
}

pub async fn delete<E: Entity>(
    State(state): State<AppState<E>>,
    Path(id): Path<String>,
) -> ApiResult<Enveloped<()>> {
    let id = parse_id(&id)?;
    let ctx = state.request_context();

    state.resources.delete(&ctx, id).await?;
    let status = StatusCode::OK;
    Ok((status, Json(ApiResponse::empty(status.as_u16(), SUCCESS_MESSAGE))))
}
