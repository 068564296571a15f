//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Startup-time catalog faults. Fatal: the process must not serve requests
/// from a catalog that failed to build.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("conflicting registration for '{name}': {detail}")]
    ConflictingRegistration { name: String, detail: String },
    #[error("duplicate entity name: '{0}'")]
    DuplicateName(String),
    #[error("entity '{entity}': {detail}")]
    InvalidEntity { entity: String, detail: String },
    #[error("catalog load: {0}")]
    Load(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("unknown module: '{0}'")]
    UnknownEntity(String),
    #[error("{entity} does not support {capability}")]
    UnsupportedOperation { entity: String, capability: String },
    #[error("{entity}: no record with id {id}")]
    RecordNotFound { entity: String, id: i64 },
    #[error("status '{current}' is terminal, no further transitions exist")]
    TransitionLocked { current: String },
    #[error("illegal transition from '{from}' to '{to}', allowed: {allowed:?}")]
    IllegalTransition {
        from: String,
        to: String,
        allowed: Vec<&'static str>,
    },
    #[error("{entity} id {id} changed between read and write, retry with fresh data")]
    ConcurrentModification { entity: String, id: i64 },
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Transport status and stable machine code. Caller-input kinds map to
    /// 4xx; catalog and persistence faults to 5xx.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Catalog(_) => (StatusCode::INTERNAL_SERVER_ERROR, "catalog_error"),
            AppError::UnknownEntity(_) => (StatusCode::NOT_FOUND, "unknown_module"),
            AppError::UnsupportedOperation { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unsupported_operation")
            }
            AppError::RecordNotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AppError::TransitionLocked { .. } => (StatusCode::CONFLICT, "transition_locked"),
            AppError::IllegalTransition { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "illegal_transition")
            }
            AppError::ConcurrentModification { .. } => {
                (StatusCode::CONFLICT, "concurrent_modification")
            }
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::IllegalTransition { allowed, .. } => {
                Some(serde_json::json!({ "allowed": allowed }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_input_kinds_map_to_4xx() {
        let cases = [
            (AppError::UnknownEntity("cityy".into()), StatusCode::NOT_FOUND),
            (
                AppError::UnsupportedOperation {
                    entity: "City".into(),
                    capability: "soft-delete".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::RecordNotFound {
                    entity: "City".into(),
                    id: 7,
                },
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::TransitionLocked {
                    current: "interested".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                AppError::IllegalTransition {
                    from: "callback_scheduled".into(),
                    to: "waiting".into(),
                    allowed: vec!["interested", "not_interested", "cancelled"],
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::ConcurrentModification {
                    entity: "Lead".into(),
                    id: 3,
                },
                StatusCode::CONFLICT,
            ),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status_and_code().0, expected, "{err}");
        }
    }

    #[test]
    fn catalog_faults_are_server_errors() {
        let err = AppError::Catalog(CatalogError::Load("boom".into()));
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn illegal_transition_enumerates_allowed_states() {
        let err = AppError::IllegalTransition {
            from: "waiting".into(),
            to: "pending".into(),
            allowed: vec!["interested", "not_interested", "callback_scheduled", "cancelled"],
        };
        let details = err.details().expect("details");
        let allowed = details["allowed"].as_array().expect("array");
        assert_eq!(allowed.len(), 4);
        assert!(err.to_string().contains("interested"));
    }
}
