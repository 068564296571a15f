//! Shared query execution: bind JSON params, decode rows back to JSON objects.

use crate::error::AppError;
use crate::sql::{PgBindValue, QueryBuf};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

pub(crate) async fn fetch_optional(pool: &PgPool, q: &QueryBuf) -> Result<Option<Value>, AppError> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(PgBindValue::from(p));
    }
    let row = query.fetch_optional(pool).await?;
    Ok(row.map(|r| row_to_json(&r)))
}

pub(crate) async fn fetch_all(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(PgBindValue::from(p));
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows.iter().map(row_to_json).collect())
}

pub(crate) fn row_to_json(row: &PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

/// Probe the cell against the types an admin table can hold; first decode
/// that sticks wins.
fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;

    macro_rules! probe {
        ($ty:ty, $conv:expr) => {
            if let Ok(Some(v)) = row.try_get::<Option<$ty>, _>(name) {
                #[allow(clippy::redundant_closure_call)]
                return ($conv)(v);
            }
        };
    }

    probe!(i16, |n: i16| Value::from(n));
    probe!(i32, |n: i32| Value::from(n));
    probe!(i64, |n: i64| Value::from(n));
    probe!(f64, |n: f64| serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null));
    probe!(bool, Value::Bool);
    probe!(uuid::Uuid, |u: uuid::Uuid| Value::String(u.to_string()));
    probe!(chrono::DateTime<chrono::Utc>, |d: chrono::DateTime<chrono::Utc>| {
        Value::String(d.to_rfc3339())
    });
    probe!(chrono::NaiveDateTime, |d: chrono::NaiveDateTime| {
        Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
    });
    probe!(chrono::NaiveDate, |d: chrono::NaiveDate| {
        Value::String(d.format("%Y-%m-%d").to_string())
    });
    probe!(String, Value::String);
    probe!(Value, |j: Value| j);
    Value::Null
}
