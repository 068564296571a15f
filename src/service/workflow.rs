//! Workflow transitions against storage: read, validate, compare-and-swap.

use crate::catalog::{Capability, EntityDescriptor};
use crate::error::AppError;
use crate::service::exec;
use crate::sql;
use crate::workflow::{validate_transition, LeadStatus};
use serde_json::Value;
use sqlx::PgPool;

pub struct WorkflowService;

impl WorkflowService {
    /// Read the current status, validate the transition, then write
    /// conditioned on the status column still holding the value that was
    /// read. A lost race surfaces as `ConcurrentModification`; the caller
    /// retries with fresh data, never this core.
    pub async fn apply_transition(
        pool: &PgPool,
        entity: &EntityDescriptor,
        id: i64,
        target: LeadStatus,
    ) -> Result<Value, AppError> {
        let column = workflow_column(entity)?;
        let current = current_status(pool, entity, column, id).await?;
        validate_transition(current, target)?;
        let q = sql::update_status_guarded(entity, column, id, current.as_str(), target.as_str());
        match exec::fetch_optional(pool, &q).await? {
            Some(row) => Ok(row),
            None => Err(AppError::ConcurrentModification {
                entity: entity.canonical_name.clone(),
                id,
            }),
        }
    }

    /// Pure query: the record's current status and the states it may move
    /// to. Empty set for terminal states.
    pub async fn valid_next_states(
        pool: &PgPool,
        entity: &EntityDescriptor,
        id: i64,
    ) -> Result<(LeadStatus, &'static [LeadStatus]), AppError> {
        let column = workflow_column(entity)?;
        let current = current_status(pool, entity, column, id).await?;
        Ok((current, current.allowed_next()))
    }
}

fn workflow_column(entity: &EntityDescriptor) -> Result<&str, AppError> {
    entity
        .workflow_column
        .as_deref()
        .ok_or_else(|| AppError::UnsupportedOperation {
            entity: entity.canonical_name.clone(),
            capability: Capability::WorkflowStatus.as_str().into(),
        })
}

async fn current_status(
    pool: &PgPool,
    entity: &EntityDescriptor,
    column: &str,
    id: i64,
) -> Result<LeadStatus, AppError> {
    let sql = sql::select_status(entity, column);
    tracing::debug!(sql = %sql, id = id, "query");
    let raw: Option<String> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let raw = raw.ok_or_else(|| AppError::RecordNotFound {
        entity: entity.canonical_name.clone(),
        id,
    })?;
    // A stored value outside the enumeration is corrupt data, not caller input.
    LeadStatus::parse(&raw).ok_or_else(|| {
        AppError::Db(sqlx::Error::Decode(
            format!("unrecognized workflow status '{raw}'").into(),
        ))
    })
}
