use crate::types::DbId;

use super::store::StoreError;

/// Failures produced by the hierarchy engine.
///
/// Every structural variant is raised before anything is written, so a
/// rejected operation leaves the store untouched.
#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    /// The node is absent, soft-deleted, or belongs to another scope.
    #[error("{kind} with id {id} not found")]
    NotFound { kind: &'static str, id: DbId },

    /// The requested parent is absent, soft-deleted, or belongs to another scope.
    #[error("Parent {kind} with id {id} not found")]
    ParentNotFound { kind: &'static str, id: DbId },

    #[error("{kind} {id} cannot be its own parent")]
    SelfParent { kind: &'static str, id: DbId },

    /// The prospective parent sits inside the moved node's own subtree.
    #[error("Moving {kind} {id} under {parent_id} would create a cycle")]
    CycleDetected {
        kind: &'static str,
        id: DbId,
        parent_id: DbId,
    },

    /// A read walk revisited a node. Stored data already violates acyclicity
    /// and needs manual repair.
    #[error("Corrupt {kind} hierarchy: node {id} reached twice while walking the tree")]
    CorruptHierarchy { kind: &'static str, id: DbId },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type HierarchyResult<T> = Result<T, HierarchyError>;
