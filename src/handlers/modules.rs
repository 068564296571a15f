//! Module catalog listing for admin tooling.

use crate::error::AppError;
use crate::response::success_many;
use crate::state::AppState;
use axum::extract::State;
use serde_json::Value;

pub async fn list_modules(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let data: Vec<Value> = state
        .catalog
        .entities()
        .map(|e| {
            serde_json::json!({
                "name": e.canonical_name,
                "table": e.table_name,
                "soft_delete": e.soft_delete.is_some(),
                "status_toggle": e.toggle_column.is_some(),
                "workflow": e.workflow_column.is_some(),
            })
        })
        .collect();
    Ok(success_many(data))
}
