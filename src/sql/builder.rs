//! Builds parameterized statements from a resolved entity descriptor.
//! Identifiers come only from the catalog; values are always bound.

use crate::catalog::{EntityDescriptor, SoftDeleteSpec};
use serde_json::Value;
use std::collections::HashMap;

/// Quote identifier for PostgreSQL (safe: only from the catalog).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(entity: &EntityDescriptor) -> String {
    format!(
        "{}.{}",
        quoted(&entity.schema_name),
        quoted(&entity.table_name)
    )
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT list: columns as-is, numeric cast to text so sqlx returns String.
fn column_list(entity: &EntityDescriptor) -> String {
    entity
        .columns
        .iter()
        .map(|c| {
            let q = quoted(&c.name);
            if c.pg_type == "numeric" {
                format!("{}::text", q)
            } else {
                q
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parameter placeholder with a SQL cast for timestamp columns so string
/// values bind correctly.
fn placeholder(entity: &EntityDescriptor, column: &str, n: usize) -> String {
    let needs_cast = entity
        .column(column)
        .map(|c| matches!(c.pg_type.as_str(), "timestamptz" | "timestamp" | "date" | "numeric"))
        .unwrap_or(false);
    if needs_cast {
        let pg_type = &entity.column(column).unwrap().pg_type;
        format!("${}::{}", n, pg_type)
    } else {
        format!("${}", n)
    }
}

/// SELECT by primary key.
pub fn select_by_id(entity: &EntityDescriptor, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Value::from(id));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}",
        column_list(entity),
        qualified_table(entity),
        quoted(&entity.pk_column),
        n
    );
    q
}

/// SELECT all rows ordered by primary key, capped. Soft-deleted rows are
/// excluded for entities carrying the marker.
pub fn select_list(entity: &EntityDescriptor, cap: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = match &entity.soft_delete {
        Some(spec) => format!(" WHERE NOT COALESCE({}, FALSE)", quoted(&spec.flag_column)),
        None => String::new(),
    };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT {}",
        column_list(entity),
        qualified_table(entity),
        where_clause,
        quoted(&entity.pk_column),
        cap
    );
    q
}

/// INSERT from body: columns present on the entity only; the primary key and
/// defaulted columns are omitted when the body does not provide a value.
pub fn insert(entity: &EntityDescriptor, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in &entity.columns {
        if c.name == entity.pk_column && !body.contains_key(&c.name) {
            continue;
        }
        let val = body.get(&c.name).cloned();
        // Absent defaulted or nullable columns are left to the database.
        if val.is_none() && (c.has_default || c.nullable) {
            continue;
        }
        let n = q.push_param(val.unwrap_or(Value::Null));
        placeholders.push(placeholder(entity, &c.name, n));
        cols.push(quoted(&c.name));
    }
    q.sql = if cols.is_empty() {
        format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            qualified_table(entity),
            column_list(entity)
        )
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            qualified_table(entity),
            cols.join(", "),
            placeholders.join(", "),
            column_list(entity)
        )
    };
    q
}

/// UPDATE by id: SET only body columns that exist on the entity. The primary
/// key, lifecycle markers, and the workflow status never move through here.
pub fn update_by_id(entity: &EntityDescriptor, id: i64, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let guarded = guarded_columns(entity);
    let mut sets = Vec::new();
    for c in &entity.columns {
        if c.name == entity.pk_column || guarded.contains(&c.name.as_str()) {
            continue;
        }
        let Some(v) = body.get(&c.name) else { continue };
        let n = q.push_param(v.clone());
        sets.push(format!(
            "{} = {}",
            quoted(&c.name),
            placeholder(entity, &c.name, n)
        ));
    }
    if sets.is_empty() {
        return select_by_id(entity, id);
    }
    sets.push(format!("{} = NOW()", quoted("updated_at")));
    let id_param = q.push_param(Value::from(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        qualified_table(entity),
        sets.join(", "),
        quoted(&entity.pk_column),
        id_param,
        column_list(entity)
    );
    q
}

/// Columns that only move through their dedicated lifecycle/workflow
/// operations.
fn guarded_columns(entity: &EntityDescriptor) -> Vec<&str> {
    let mut guarded = vec!["updated_at", "created_at"];
    if let Some(spec) = &entity.soft_delete {
        guarded.push(spec.flag_column.as_str());
        guarded.push(spec.timestamp_column.as_str());
    }
    if let Some(col) = &entity.toggle_column {
        guarded.push(col.as_str());
    }
    if let Some(col) = &entity.workflow_column {
        guarded.push(col.as_str());
    }
    guarded
}

/// Soft delete: one atomic UPDATE setting the flag and stamping the deletion
/// timestamp. Re-running refreshes the timestamp.
pub fn soft_delete(entity: &EntityDescriptor, spec: &SoftDeleteSpec, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Value::from(id));
    q.sql = format!(
        "UPDATE {} SET {} = TRUE, {} = NOW(), {} = NOW() WHERE {} = ${} RETURNING {}",
        qualified_table(entity),
        quoted(&spec.flag_column),
        quoted(&spec.timestamp_column),
        quoted("updated_at"),
        quoted(&entity.pk_column),
        n,
        column_list(entity)
    );
    q
}

/// Flip the active/inactive marker in place.
pub fn toggle_status(entity: &EntityDescriptor, toggle_column: &str, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Value::from(id));
    q.sql = format!(
        "UPDATE {} SET {} = NOT COALESCE({}, FALSE), {} = NOW() WHERE {} = ${} RETURNING {}",
        qualified_table(entity),
        quoted(toggle_column),
        quoted(toggle_column),
        quoted("updated_at"),
        quoted(&entity.pk_column),
        n,
        column_list(entity)
    );
    q
}

/// SELECT the workflow status column for one record.
pub fn select_status(entity: &EntityDescriptor, status_column: &str) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = $1",
        quoted(status_column),
        qualified_table(entity),
        quoted(&entity.pk_column)
    )
}

/// Compare-and-swap status write: conditioned on the column still holding
/// the state that was read. Zero rows means the record changed underneath.
pub fn update_status_guarded(
    entity: &EntityDescriptor,
    status_column: &str,
    id: i64,
    from: &str,
    to: &str,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let to_n = q.push_param(Value::from(to));
    let id_n = q.push_param(Value::from(id));
    let from_n = q.push_param(Value::from(from));
    q.sql = format!(
        "UPDATE {} SET {} = ${}, {} = NOW() WHERE {} = ${} AND {} = ${} RETURNING {}",
        qualified_table(entity),
        quoted(status_column),
        to_n,
        quoted("updated_at"),
        quoted(&entity.pk_column),
        id_n,
        quoted(status_column),
        from_n,
        column_list(entity)
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{resolve_catalog, CatalogConfig, EntityDescriptor};

    fn lead() -> EntityDescriptor {
        let config: CatalogConfig = serde_json::from_value(serde_json::json!({
            "entities": [
                { "name": "Lead", "table": "leads", "fields": [
                    { "name": "customer_name", "type": "text", "nullable": false },
                    { "name": "status", "type": "text", "nullable": false, "is_workflow_status": true },
                    { "name": "active", "type": "boolean", "nullable": false, "is_status_toggle": true },
                    { "name": "deleted", "type": "boolean", "nullable": false, "is_soft_deletable": true }
                ]}
            ]
        }))
        .unwrap();
        resolve_catalog(&config)
            .unwrap()
            .lookup("leads")
            .unwrap()
            .clone()
    }

    #[test]
    fn soft_delete_is_one_update_setting_flag_and_timestamp() {
        let entity = lead();
        let spec = entity.soft_delete.clone().unwrap();
        let q = soft_delete(&entity, &spec, 7);
        assert_eq!(
            q.sql,
            "UPDATE \"public\".\"leads\" SET \"deleted\" = TRUE, \"deleted_at\" = NOW(), \"updated_at\" = NOW() WHERE \"id\" = $1 RETURNING \"id\", \"customer_name\", \"status\", \"active\", \"deleted\", \"created_at\", \"updated_at\", \"deleted_at\""
        );
        assert_eq!(q.params, vec![serde_json::json!(7)]);
    }

    #[test]
    fn guarded_status_update_conditions_on_the_read_state() {
        let entity = lead();
        let q = update_status_guarded(&entity, "status", 3, "waiting", "interested");
        assert!(q.sql.contains("SET \"status\" = $1"));
        assert!(q.sql.contains("WHERE \"id\" = $2 AND \"status\" = $3"));
        assert_eq!(
            q.params,
            vec![
                serde_json::json!("interested"),
                serde_json::json!(3),
                serde_json::json!("waiting")
            ]
        );
    }

    #[test]
    fn list_excludes_soft_deleted_rows() {
        let entity = lead();
        let q = select_list(&entity, 500);
        assert!(q.sql.contains("WHERE NOT COALESCE(\"deleted\", FALSE)"));
        assert!(q.sql.ends_with("ORDER BY \"id\" LIMIT 500"));
    }

    #[test]
    fn insert_omits_pk_and_defaulted_lifecycle_columns() {
        let entity = lead();
        let body: HashMap<String, serde_json::Value> =
            [("customer_name".to_string(), serde_json::json!("Ada"))].into();
        let q = insert(&entity, &body);
        assert_eq!(
            q.sql,
            "INSERT INTO \"public\".\"leads\" (\"customer_name\") VALUES ($1) RETURNING \"id\", \"customer_name\", \"status\", \"active\", \"deleted\", \"created_at\", \"updated_at\", \"deleted_at\""
        );
    }

    #[test]
    fn update_never_touches_guarded_columns() {
        let entity = lead();
        let body: HashMap<String, serde_json::Value> = [
            ("customer_name".to_string(), serde_json::json!("Ada")),
            ("status".to_string(), serde_json::json!("cancelled")),
            ("active".to_string(), serde_json::json!(false)),
            ("deleted".to_string(), serde_json::json!(true)),
            ("id".to_string(), serde_json::json!(99)),
        ]
        .into();
        let q = update_by_id(&entity, 4, &body);
        assert!(q.sql.contains("\"customer_name\" = $1"));
        assert!(!q.sql.contains("\"status\" ="));
        assert!(!q.sql.contains("\"active\" ="));
        assert!(!q.sql.contains("\"deleted\" ="));
        assert!(q.sql.contains("\"updated_at\" = NOW()"));
        assert!(q.sql.contains("WHERE \"id\" = $2"));
    }

    #[test]
    fn update_with_no_settable_columns_degrades_to_a_read() {
        let entity = lead();
        let body: HashMap<String, serde_json::Value> =
            [("deleted".to_string(), serde_json::json!(true))].into();
        let q = update_by_id(&entity, 4, &body);
        assert!(q.sql.starts_with("SELECT"));
    }
}
