//! Workflow handlers: status transitions and the valid-next-states query.

use crate::error::AppError;
use crate::handlers::entity::parse_id;
use crate::resolver::resolve;
use crate::response::{success_one_ok, SuccessOne};
use crate::service::WorkflowService;
use crate::state::AppState;
use crate::workflow::LeadStatus;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct StatusChange {
    pub status: String,
}

pub async fn change_status(
    State(state): State<AppState>,
    Path((module, id_str)): Path<(String, String)>,
    Json(body): Json<StatusChange>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let entity = resolve(&state.catalog, &module)?;
    let id = parse_id(&id_str)?;
    let target = LeadStatus::parse(body.status.trim())
        .ok_or_else(|| AppError::BadRequest(format!("unknown status '{}'", body.status)))?;
    let row = WorkflowService::apply_transition(&state.pool, entity, id, target).await?;
    Ok(success_one_ok(row))
}

/// Presentation layers use this to restrict offered choices; it reads from
/// the same transition table the apply path enforces.
pub async fn status_options(
    State(state): State<AppState>,
    Path((module, id_str)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let entity = resolve(&state.catalog, &module)?;
    let id = parse_id(&id_str)?;
    let (current, allowed) = WorkflowService::valid_next_states(&state.pool, entity, id).await?;
    Ok(Json(SuccessOne {
        data: serde_json::json!({
            "current": current.as_str(),
            "allowed": allowed.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        }),
        meta: None,
    }))
}
