//! Lifecycle handlers: soft delete and active/inactive toggle for any module.

use crate::error::AppError;
use crate::handlers::entity::parse_id;
use crate::resolver::resolve;
use crate::response::success_one_ok;
use crate::service::LifecycleService;
use crate::state::AppState;
use axum::extract::{Path, State};

/// DELETE on a module record is always a soft delete; rows are never
/// removed physically.
pub async fn soft_delete(
    State(state): State<AppState>,
    Path((module, id_str)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let entity = resolve(&state.catalog, &module)?;
    let id = parse_id(&id_str)?;
    let row = LifecycleService::soft_delete(&state.pool, entity, id).await?;
    Ok(success_one_ok(row))
}

pub async fn toggle_status(
    State(state): State<AppState>,
    Path((module, id_str)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let entity = resolve(&state.catalog, &module)?;
    let id = parse_id(&id_str)?;
    let row = LifecycleService::toggle_status(&state.pool, entity, id).await?;
    Ok(success_one_ok(row))
}
