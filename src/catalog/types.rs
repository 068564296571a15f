//! Raw catalog document types (JSON) describing the registered entity schemas.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    /// PostgreSQL type name (e.g. "text", "boolean", "bigint", "numeric").
    #[serde(rename = "type", default = "default_field_type")]
    pub type_: String,
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// Marks the boolean soft-delete flag column.
    #[serde(default)]
    pub is_soft_deletable: bool,
    /// Marks the boolean active/inactive marker column.
    #[serde(default)]
    pub is_status_toggle: bool,
    /// Marks the text column governed by the workflow state machine.
    #[serde(default)]
    pub is_workflow_status: bool,
}

fn default_field_type() -> String {
    "text".into()
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Code-facing name, case-preserving (e.g. "City").
    pub name: String,
    /// Storage-facing table name (e.g. "cities").
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default = "default_pk")]
    pub primary_key: String,
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub comment: Option<String>,
}

fn default_pk() -> String {
    "id".into()
}

/// The whole catalog document for in-memory loading.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub entities: Vec<EntityConfig>,
}
