use crate::types::DbId;

/// Domain errors that are not about tree structure.
///
/// Structural failures (cycles, missing parents, corrupt ancestry) live in
/// [`crate::hierarchy::HierarchyError`].
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}
