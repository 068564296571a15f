//! Generic CRUD execution against PostgreSQL, driven by the catalog.

use crate::catalog::EntityDescriptor;
use crate::error::AppError;
use crate::service::exec;
use crate::sql;
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;

/// Hard cap on list results; admin screens never page past this.
const LIST_CAP: i64 = 500;

pub struct CrudService;

impl CrudService {
    /// All rows ordered by primary key; soft-deleted rows are excluded for
    /// entities that carry the marker.
    pub async fn list(pool: &PgPool, entity: &EntityDescriptor) -> Result<Vec<Value>, AppError> {
        let q = sql::select_list(entity, LIST_CAP);
        exec::fetch_all(pool, &q).await
    }

    /// Fetch one row by primary key. Returns the JSON object or None.
    pub async fn read(
        pool: &PgPool,
        entity: &EntityDescriptor,
        id: i64,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::select_by_id(entity, id);
        exec::fetch_optional(pool, &q).await
    }

    /// Insert one row; defaulted columns may be omitted from the body.
    /// Returns the created row.
    pub async fn create(
        pool: &PgPool,
        entity: &EntityDescriptor,
        body: &HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        let q = sql::insert(entity, body);
        exec::fetch_optional(pool, &q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    /// Update one row by id. Lifecycle markers and workflow status are
    /// ignored here; they move only through their dedicated operations.
    pub async fn update(
        pool: &PgPool,
        entity: &EntityDescriptor,
        id: i64,
        body: &HashMap<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::update_by_id(entity, id, body);
        exec::fetch_optional(pool, &q).await
    }
}
