use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use dropdeck_core::error::CoreError;
use dropdeck_core::hierarchy::{HierarchyError, StoreError};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`HierarchyError`] for domain errors and raw
/// sqlx failures from pool and transaction handling. Implements
/// [`IntoResponse`] to produce consistent `{"error", "code"}` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `dropdeck_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A structural error from the hierarchy engine.
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    /// A database error from sqlx (pool, begin, commit).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            },

            // --- Hierarchy engine ---
            AppError::Hierarchy(err) => classify_hierarchy_error(err),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Map engine failures onto HTTP statuses.
///
/// Client-caused structural errors keep their message; corrupt stored data
/// and backend failures are logged and sanitized.
fn classify_hierarchy_error(err: &HierarchyError) -> (StatusCode, &'static str, String) {
    match err {
        HierarchyError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        HierarchyError::ParentNotFound { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "PARENT_NOT_FOUND",
            err.to_string(),
        ),
        HierarchyError::SelfParent { .. } => {
            (StatusCode::BAD_REQUEST, "SELF_PARENT", err.to_string())
        }
        HierarchyError::CycleDetected { .. } => {
            (StatusCode::CONFLICT, "CYCLE_DETECTED", err.to_string())
        }
        HierarchyError::CorruptHierarchy { kind, id } => {
            tracing::error!(kind, id, "Stored hierarchy contains a cycle");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CORRUPT_HIERARCHY",
                "The stored hierarchy is inconsistent".to_string(),
            )
        }
        HierarchyError::Store(store) => classify_store_error(store),
    }
}

fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err.backend().downcast_ref::<sqlx::Error>() {
        Some(sqlx_err) => {
            tracing::debug!(error = %err, "Store operation failed");
            classify_sqlx_error(sqlx_err)
        }
        None => {
            tracing::error!(error = %err, "Store operation failed");
            internal()
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Serialization failures (`40001`) from concurrent moves map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("40001") => {
            tracing::warn!(error = %db_err, "Serialization conflict");
            (
                StatusCode::CONFLICT,
                "SERIALIZATION_CONFLICT",
                "The hierarchy was modified concurrently, retry the request".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
