//! Database bootstrap: ensure the database and the catalog's entity tables
//! exist before serving.

use crate::catalog::{Catalog, ColumnInfo, EntityDescriptor};
use crate::error::AppError;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::collections::HashSet;
use std::str::FromStr;

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Ensure the database in `database_url` exists; create it if not. Connects
/// to the default `postgres` database to run CREATE DATABASE. Call before
/// creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await
            .map_err(AppError::Db)?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

/// CREATE SCHEMA / CREATE TABLE IF NOT EXISTS for every cataloged entity.
/// Idempotent; existing tables are left untouched.
pub async fn ensure_entity_tables(pool: &PgPool, catalog: &Catalog) -> Result<(), AppError> {
    let schemas: HashSet<&str> = catalog.entities().map(|e| e.schema_name.as_str()).collect();
    for schema in schemas {
        let ddl = format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema));
        tracing::debug!(sql = %ddl, "ddl");
        sqlx::query(&ddl).execute(pool).await?;
    }
    for entity in catalog.entities() {
        let ddl = table_ddl(entity);
        tracing::debug!(sql = %ddl, "ddl");
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}

fn table_ddl(entity: &EntityDescriptor) -> String {
    let col_defs: Vec<String> = entity.columns.iter().map(|c| column_ddl(entity, c)).collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {}.{} ({})",
        quote_ident(&entity.schema_name),
        quote_ident(&entity.table_name),
        col_defs.join(", ")
    )
}

fn column_ddl(entity: &EntityDescriptor, col: &ColumnInfo) -> String {
    let name = quote_ident(&col.name);
    if col.name == entity.pk_column {
        return if col.pg_type == "bigint" && col.has_default {
            format!("{} BIGSERIAL PRIMARY KEY", name)
        } else {
            format!("{} {} PRIMARY KEY", name, col.pg_type)
        };
    }
    if let Some(spec) = &entity.soft_delete {
        if col.name == spec.flag_column {
            return format!("{} BOOLEAN NOT NULL DEFAULT FALSE", name);
        }
        if col.name == spec.timestamp_column {
            return format!("{} TIMESTAMPTZ", name);
        }
    }
    if Some(&col.name) == entity.toggle_column.as_ref() {
        // New records start active.
        return format!("{} BOOLEAN NOT NULL DEFAULT TRUE", name);
    }
    if Some(&col.name) == entity.workflow_column.as_ref() {
        // Initial workflow state is assigned at creation.
        return format!("{} TEXT NOT NULL DEFAULT 'pending'", name);
    }
    if matches!(col.name.as_str(), "created_at" | "updated_at") {
        return format!("{} TIMESTAMPTZ NOT NULL DEFAULT NOW()", name);
    }
    let mut def = format!("{} {}", name, col.pg_type);
    if !col.nullable {
        def.push_str(" NOT NULL");
    }
    def
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{resolve_catalog, CatalogConfig};

    #[test]
    fn table_ddl_covers_pk_lifecycle_and_audit_columns() {
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
        let catalog = resolve_catalog(&config).unwrap();
        let ddl = table_ddl(catalog.lookup("leads").unwrap());
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS \"public\".\"leads\""));
        assert!(ddl.contains("\"id\" BIGSERIAL PRIMARY KEY"));
        assert!(ddl.contains("\"customer_name\" text NOT NULL"));
        assert!(ddl.contains("\"status\" TEXT NOT NULL DEFAULT 'pending'"));
        assert!(ddl.contains("\"active\" BOOLEAN NOT NULL DEFAULT TRUE"));
        assert!(ddl.contains("\"deleted\" BOOLEAN NOT NULL DEFAULT FALSE"));
        assert!(ddl.contains("\"deleted_at\" TIMESTAMPTZ"));
        assert!(ddl.contains("\"created_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW()"));
    }

    #[test]
    fn database_url_parsing_splits_admin_url_and_name() {
        let (admin, name) =
            parse_db_name_from_url("postgres://localhost:5432/brokerage?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://localhost:5432/postgres");
        assert_eq!(name, "brokerage");
    }
}
