use std::error::Error as StdError;

use async_trait::async_trait;

use crate::types::{DbId, Timestamp};

use super::HierarchyNode;

/// A failure inside the persistence backend (connection loss, serialization
/// conflict, constraint violation, ...).
///
/// The engine never retries; the error travels up to the caller, whose
/// transaction is then rolled back.
#[derive(Debug, thiserror::Error)]
#[error("Store operation failed: {context}")]
pub struct StoreError {
    context: String,
    #[source]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

impl StoreError {
    pub fn new(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// The backend error, for callers that need to classify it
    /// (e.g. downcasting to `sqlx::Error`).
    pub fn backend(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything a store needs to insert a node. `order` is `Some` only for
/// kinds with [`super::SiblingOrdering::Explicit`].
#[derive(Debug)]
pub struct NodeDraft<'a, N: HierarchyNode> {
    pub scope: N::Scope,
    pub parent_id: Option<DbId>,
    pub order: Option<i32>,
    pub payload: &'a N::Payload,
}

/// Persistence contract for one node kind.
///
/// Pure CRUD: no method knows anything about ancestry, cycles or cascades.
/// Reads are scope-filtered and, unless stated otherwise, return live
/// (not soft-deleted) rows only.
#[async_trait]
pub trait NodeStore<N: HierarchyNode>: Send {
    /// Live node by id within `scope`.
    async fn get(&mut self, id: DbId, scope: N::Scope) -> StoreResult<Option<N>>;

    /// Live node by id within `scope`, locked against concurrent writes
    /// until the enclosing transaction ends.
    ///
    /// Used for the parent of a create or move: a delete of that parent
    /// has to wait for the new link to commit (and then cascades over it),
    /// or wins first and the lookup sees the row as deleted. Stores without
    /// concurrent writers can keep the default.
    async fn get_locked(&mut self, id: DbId, scope: N::Scope) -> StoreResult<Option<N>> {
        self.get(id, scope).await
    }

    /// Node by id within `scope`, soft-deleted or not.
    async fn get_including_deleted(
        &mut self,
        id: DbId,
        scope: N::Scope,
    ) -> StoreResult<Option<N>>;

    /// Live children of `parent_id` (scope roots when `None`). No ordering
    /// guarantee; callers sort with [`super::sibling_cmp`].
    async fn children(&mut self, parent_id: Option<DbId>, scope: N::Scope) -> StoreResult<Vec<N>>;

    async fn create(&mut self, draft: NodeDraft<'_, N>) -> StoreResult<N>;

    /// Persist parent link, order and payload of an existing live node and
    /// return the stored row.
    async fn save(&mut self, node: &N) -> StoreResult<N>;

    /// Soft-delete a single row. Returns `false` if it was already deleted.
    async fn mark_deleted(&mut self, id: DbId, at: Timestamp) -> StoreResult<bool>;
}
