//! Build the catalog from a config document, a JSON file, or live database metadata.

use crate::catalog::registry::Catalog;
use crate::catalog::resolved::{ColumnInfo, EntityDescriptor, SoftDeleteSpec};
use crate::catalog::types::{CatalogConfig, EntityConfig, FieldConfig};
use crate::catalog::validator::{is_boolean_type, is_text_type, validate};
use crate::error::CatalogError;
use sqlx::PgPool;
use std::collections::HashSet;

pub const DEFAULT_SCHEMA: &str = "public";

/// Audit columns appended to every entity when not declared.
const AUDIT_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

/// Timestamp column stamped by soft-delete when the config does not name one.
const DELETED_AT: &str = "deleted_at";

/// Flatten a validated config into the runtime catalog. Call once at startup;
/// the result is immutable and safe to share.
pub fn resolve_catalog(config: &CatalogConfig) -> Result<Catalog, CatalogError> {
    validate(config)?;
    let mut catalog = Catalog::new();
    for e in &config.entities {
        catalog.register(resolve_entity(e))?;
    }
    Ok(catalog)
}

fn resolve_entity(e: &EntityConfig) -> EntityDescriptor {
    let mut columns: Vec<ColumnInfo> = Vec::with_capacity(e.fields.len() + 4);

    // The primary key is synthesized as a defaulted bigint when the config
    // does not declare it as a field.
    if !e.fields.iter().any(|f| f.name == e.primary_key) {
        columns.push(ColumnInfo {
            name: e.primary_key.clone(),
            pg_type: "bigint".into(),
            nullable: false,
            has_default: true,
        });
    }

    let soft_delete = e
        .fields
        .iter()
        .find(|f| f.is_soft_deletable)
        .map(|f| SoftDeleteSpec {
            flag_column: f.name.clone(),
            timestamp_column: DELETED_AT.into(),
        });
    let toggle_column = e
        .fields
        .iter()
        .find(|f| f.is_status_toggle)
        .map(|f| f.name.clone());
    let workflow_column = e
        .fields
        .iter()
        .find(|f| f.is_workflow_status)
        .map(|f| f.name.clone());

    for f in &e.fields {
        let is_pk = f.name == e.primary_key;
        // Lifecycle markers and the workflow status carry DB defaults so
        // creates may omit them.
        let has_default =
            is_pk || f.is_soft_deletable || f.is_status_toggle || f.is_workflow_status;
        columns.push(ColumnInfo {
            name: f.name.clone(),
            pg_type: f.type_.clone(),
            nullable: if is_pk { false } else { f.nullable },
            has_default,
        });
    }

    let declared: HashSet<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    let mut appended: Vec<ColumnInfo> = Vec::new();
    for name in AUDIT_COLUMNS {
        if !declared.contains(name) {
            appended.push(ColumnInfo {
                name: name.into(),
                pg_type: "timestamptz".into(),
                nullable: false,
                has_default: true,
            });
        }
    }
    if let Some(ref spec) = soft_delete {
        if !declared.contains(spec.timestamp_column.as_str()) {
            appended.push(ColumnInfo {
                name: spec.timestamp_column.clone(),
                pg_type: "timestamptz".into(),
                nullable: true,
                has_default: false,
            });
        }
    }
    columns.extend(appended);

    EntityDescriptor {
        canonical_name: e.name.clone(),
        schema_name: e.schema.clone().unwrap_or_else(|| DEFAULT_SCHEMA.into()),
        table_name: e.table.clone(),
        pk_column: e.primary_key.clone(),
        columns,
        soft_delete,
        toggle_column,
        workflow_column,
    }
}

/// Catalog from a JSON document on disk (see sample/catalog.json).
pub fn load_from_path(path: &str) -> Result<Catalog, CatalogError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CatalogError::Load(format!("{}: {}", path, e)))?;
    let config: CatalogConfig =
        serde_json::from_str(&raw).map_err(|e| CatalogError::Load(e.to_string()))?;
    resolve_catalog(&config)
}

/// Catalog config discovered from the persistence layer's schema metadata.
/// Capability columns are tagged by name convention; every table in the
/// schema becomes an entity with its table name as the canonical name.
pub async fn discover_from_pool(
    pool: &PgPool,
    schema: &str,
) -> Result<CatalogConfig, CatalogError> {
    let sql = "SELECT table_name, column_name, data_type, is_nullable \
               FROM information_schema.columns \
               WHERE table_schema = $1 \
               ORDER BY table_name, ordinal_position";
    tracing::debug!(sql = %sql, schema = %schema, "query");
    let rows: Vec<(String, String, String, String)> = sqlx::query_as(sql)
        .bind(schema)
        .fetch_all(pool)
        .await
        .map_err(|e| CatalogError::Load(e.to_string()))?;

    let mut entities: Vec<EntityConfig> = Vec::new();
    for (table, column, data_type, is_nullable) in rows {
        if entities.last().map(|e| e.table.as_str()) != Some(table.as_str()) {
            entities.push(EntityConfig {
                name: table.clone(),
                table: table.clone(),
                schema: Some(schema.to_string()),
                primary_key: "id".into(),
                fields: Vec::new(),
                comment: None,
            });
        }
        let entity = entities.last_mut().unwrap();
        let mut field = FieldConfig {
            name: column,
            type_: data_type,
            nullable: is_nullable.eq_ignore_ascii_case("yes"),
            is_soft_deletable: false,
            is_status_toggle: false,
            is_workflow_status: false,
        };
        tag_by_convention(&mut field);
        entity.fields.push(field);
    }
    Ok(CatalogConfig { entities })
}

/// Column-name conventions for capability tagging during discovery.
pub(crate) fn tag_by_convention(field: &mut FieldConfig) {
    let name = field.name.to_lowercase();
    if is_boolean_type(&field.type_) {
        match name.as_str() {
            "deleted" | "is_deleted" => field.is_soft_deletable = true,
            "active" | "is_active" | "enabled" => field.is_status_toggle = true,
            _ => {}
        }
    } else if is_text_type(&field.type_) && name == "status" {
        field.is_workflow_status = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::resolved::Capability;

    fn config(json: serde_json::Value) -> CatalogConfig {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn resolve_appends_pk_and_audit_columns() {
        let config = config(serde_json::json!({
            "entities": [
                { "name": "City", "table": "cities", "fields": [
                    { "name": "name", "type": "text", "nullable": false }
                ]}
            ]
        }));
        let catalog = resolve_catalog(&config).unwrap();
        let city = catalog.lookup("city").unwrap();
        let names: Vec<&str> = city.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "name", "created_at", "updated_at"]);
        assert!(city.column("id").unwrap().has_default);
        assert_eq!(city.schema_name, "public");
    }

    #[test]
    fn soft_deletable_entity_gets_a_deletion_timestamp_column() {
        let config = config(serde_json::json!({
            "entities": [
                { "name": "Courier", "table": "couriers", "fields": [
                    { "name": "name", "type": "text", "nullable": false },
                    { "name": "deleted", "type": "boolean", "nullable": false, "is_soft_deletable": true }
                ]}
            ]
        }));
        let catalog = resolve_catalog(&config).unwrap();
        let courier = catalog.lookup("couriers").unwrap();
        let spec = courier.soft_delete.as_ref().unwrap();
        assert_eq!(spec.flag_column, "deleted");
        assert_eq!(spec.timestamp_column, "deleted_at");
        assert!(courier.column("deleted_at").is_some());
        assert!(courier.has_capability(Capability::SoftDelete));
    }

    #[test]
    fn capability_columns_carry_defaults_for_insert() {
        let config = config(serde_json::json!({
            "entities": [
                { "name": "Lead", "table": "leads", "fields": [
                    { "name": "customer_name", "type": "text", "nullable": false },
                    { "name": "status", "type": "text", "nullable": false, "is_workflow_status": true },
                    { "name": "active", "type": "boolean", "nullable": false, "is_status_toggle": true }
                ]}
            ]
        }));
        let catalog = resolve_catalog(&config).unwrap();
        let lead = catalog.lookup("Leads").unwrap();
        assert!(lead.column("status").unwrap().has_default);
        assert!(lead.column("active").unwrap().has_default);
        assert!(!lead.column("customer_name").unwrap().has_default);
        assert_eq!(lead.workflow_column.as_deref(), Some("status"));
        assert_eq!(lead.toggle_column.as_deref(), Some("active"));
    }

    fn tagged(name: &str, type_: &str) -> FieldConfig {
        let mut field = FieldConfig {
            name: name.into(),
            type_: type_.into(),
            nullable: false,
            is_soft_deletable: false,
            is_status_toggle: false,
            is_workflow_status: false,
        };
        tag_by_convention(&mut field);
        field
    }

    #[test]
    fn convention_tagging_matches_lifecycle_columns() {
        assert!(tagged("is_deleted", "boolean").is_soft_deletable);
        assert!(tagged("deleted", "boolean").is_soft_deletable);
        assert!(tagged("active", "boolean").is_status_toggle);
        assert!(tagged("enabled", "boolean").is_status_toggle);
        assert!(tagged("status", "text").is_workflow_status);
        // A text column that merely mentions status is not a workflow column.
        assert!(!tagged("status_note", "text").is_workflow_status);
        // A boolean named status is not a workflow column either.
        assert!(!tagged("status", "boolean").is_workflow_status);
    }
}
