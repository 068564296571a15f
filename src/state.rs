//! Shared application state for all routes.

use crate::catalog::Catalog;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Built once at startup; read-only thereafter, so no lock is needed.
    pub catalog: Arc<Catalog>,
}
