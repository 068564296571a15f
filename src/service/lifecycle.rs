//! Generic lifecycle operations: soft-delete and active/inactive toggle.
//! Capability-checked before any write; exactly one atomic UPDATE per record.

use crate::catalog::{Capability, EntityDescriptor};
use crate::error::AppError;
use crate::service::exec;
use crate::sql;
use serde_json::Value;
use sqlx::PgPool;

pub struct LifecycleService;

impl LifecycleService {
    /// Mark the record deleted and stamp the deletion timestamp. Idempotent:
    /// repeating the call succeeds and refreshes the timestamp.
    pub async fn soft_delete(
        pool: &PgPool,
        entity: &EntityDescriptor,
        id: i64,
    ) -> Result<Value, AppError> {
        let spec = entity
            .soft_delete
            .as_ref()
            .ok_or_else(|| unsupported(entity, Capability::SoftDelete.as_str()))?;
        let q = sql::soft_delete(entity, spec, id);
        exec::fetch_optional(pool, &q)
            .await?
            .ok_or_else(|| not_found(entity, id))
    }

    /// Flip the active/inactive marker. Workflow status never moves through
    /// here: a workflow-bearing entity without a distinct active marker is
    /// rejected outright.
    pub async fn toggle_status(
        pool: &PgPool,
        entity: &EntityDescriptor,
        id: i64,
    ) -> Result<Value, AppError> {
        let column = match entity.toggle_column.as_deref() {
            Some(column) => column,
            None if entity.workflow_column.is_some() => {
                return Err(unsupported(
                    entity,
                    "status-toggle (workflow status moves only through transitions)",
                ));
            }
            None => return Err(unsupported(entity, Capability::StatusToggle.as_str())),
        };
        let q = sql::toggle_status(entity, column, id);
        exec::fetch_optional(pool, &q)
            .await?
            .ok_or_else(|| not_found(entity, id))
    }
}

fn unsupported(entity: &EntityDescriptor, capability: &str) -> AppError {
    AppError::UnsupportedOperation {
        entity: entity.canonical_name.clone(),
        capability: capability.into(),
    }
}

fn not_found(entity: &EntityDescriptor, id: i64) -> AppError {
    AppError::RecordNotFound {
        entity: entity.canonical_name.clone(),
        id,
    }
}
