//! Entity CRUD handlers: list, create, read, update.

use crate::error::AppError;
use crate::resolver::resolve;
use crate::response::{success_many, success_one_created, success_one_ok};
use crate::service::CrudService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

pub(crate) fn parse_id(id_str: &str) -> Result<i64, AppError> {
    let id: i64 = id_str
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", id_str)))?;
    if id <= 0 {
        return Err(AppError::BadRequest("id must be a positive integer".into()));
    }
    Ok(id)
}

pub(crate) fn body_to_map(value: Value) -> Result<HashMap<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(module): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let entity = resolve(&state.catalog, &module)?;
    let rows = CrudService::list(&state.pool, entity).await?;
    Ok(success_many(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Path(module): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let entity = resolve(&state.catalog, &module)?;
    let body = body_to_map(body)?;
    let row = CrudService::create(&state.pool, entity, &body).await?;
    Ok(success_one_created(row))
}

pub async fn read(
    State(state): State<AppState>,
    Path((module, id_str)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let entity = resolve(&state.catalog, &module)?;
    let id = parse_id(&id_str)?;
    let row = CrudService::read(&state.pool, entity, id)
        .await?
        .ok_or_else(|| AppError::RecordNotFound {
            entity: entity.canonical_name.clone(),
            id,
        })?;
    Ok(success_one_ok(row))
}

pub async fn update(
    State(state): State<AppState>,
    Path((module, id_str)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let entity = resolve(&state.catalog, &module)?;
    let id = parse_id(&id_str)?;
    let body = body_to_map(body)?;
    let row = CrudService::update(&state.pool, entity, id, &body)
        .await?
        .ok_or_else(|| AppError::RecordNotFound {
            entity: entity.canonical_name.clone(),
            id,
        })?;
    Ok(success_one_ok(row))
}
