//! Brokerage admin backend: catalog-driven REST modules with a generic lifecycle engine.

pub mod catalog;
pub mod error;
pub mod handlers;
pub mod resolver;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod workflow;

pub use catalog::{
    discover_from_pool, load_from_path, resolve_catalog, Capability, Catalog, CatalogConfig,
    EntityDescriptor,
};
pub use error::{AppError, CatalogError};
pub use resolver::resolve;
pub use response::{success_many, success_one_created, success_one_ok};
pub use routes::{api_routes, common_routes, common_routes_with_ready};
pub use service::{CrudService, LifecycleService, WorkflowService};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_entity_tables};
pub use workflow::LeadStatus;
