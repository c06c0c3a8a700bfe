use chrono::Utc;

use crate::types::DbId;

use super::{
    Ancestry, HierarchyError, HierarchyNode, HierarchyResult, NodeDraft, NodeStore,
    OrderAllocator, SiblingOrdering,
};

/// The only write path into tree structure.
///
/// Each operation expects `store` to be bound to a single transaction that
/// the caller commits on `Ok` and drops (rolls back) on `Err`. All
/// validation happens before the first write.
pub struct TreeMutations;

impl TreeMutations {
    /// Insert a node under `parent_id` (or as a scope root).
    ///
    /// The parent must be live and in `scope`. Explicitly ordered kinds are
    /// appended after their current siblings.
    pub async fn create<N, S>(
        store: &mut S,
        scope: N::Scope,
        parent_id: Option<DbId>,
        payload: &N::Payload,
    ) -> HierarchyResult<N>
    where
        N: HierarchyNode,
        S: NodeStore<N> + ?Sized,
    {
        if let Some(parent_id) = parent_id {
            require_parent::<N, S>(store, parent_id, scope).await?;
        }

        let order = match N::ORDERING {
            SiblingOrdering::Explicit => {
                Some(OrderAllocator::next_order::<N, S>(store, parent_id, scope).await?)
            }
            SiblingOrdering::CreatedAt => None,
        };

        let node = store
            .create(NodeDraft {
                scope,
                parent_id,
                order,
                payload,
            })
            .await?;
        Ok(node)
    }

    /// Move a node under `new_parent_id` (or to the scope root).
    ///
    /// Rejects moving a node under itself or under any of its descendants.
    /// Only the parent link changes; the node keeps its `order` even if it
    /// collides with its new siblings.
    pub async fn reparent<N, S>(
        store: &mut S,
        node_id: DbId,
        new_parent_id: Option<DbId>,
        scope: N::Scope,
    ) -> HierarchyResult<N>
    where
        N: HierarchyNode,
        S: NodeStore<N> + ?Sized,
    {
        let mut node = require_live::<N, S>(store, node_id, scope).await?;

        if let Some(parent_id) = new_parent_id {
            if parent_id == node_id {
                return Err(HierarchyError::SelfParent {
                    kind: N::KIND,
                    id: node_id,
                });
            }

            let parent = require_parent::<N, S>(store, parent_id, scope).await?;

            // The prospective parent's ancestor chain must not pass through
            // the node being moved.
            let chain = Ancestry::ancestors(store, &parent).await?;
            if chain.iter().any(|ancestor| ancestor.id() == node_id) {
                return Err(HierarchyError::CycleDetected {
                    kind: N::KIND,
                    id: node_id,
                    parent_id,
                });
            }
        }

        node.set_parent_id(new_parent_id);
        Ok(store.save(&node).await?)
    }

    /// Apply non-structural field changes. Never touches the parent link.
    pub async fn update<N, S>(
        store: &mut S,
        node_id: DbId,
        scope: N::Scope,
        changes: &N::Changes,
    ) -> HierarchyResult<N>
    where
        N: HierarchyNode,
        S: NodeStore<N> + ?Sized,
    {
        let mut node = require_live::<N, S>(store, node_id, scope).await?;
        node.apply_changes(changes);
        Ok(store.save(&node).await?)
    }

    /// Soft-delete a node and every live descendant, returning how many
    /// rows were newly marked.
    ///
    /// A node that exists but is already deleted is a no-op (`Ok(0)`).
    /// Traversal is depth-first over an explicit stack, and children are
    /// re-read after their parent is marked so only still-live rows are
    /// visited.
    pub async fn delete<N, S>(store: &mut S, node_id: DbId, scope: N::Scope) -> HierarchyResult<usize>
    where
        N: HierarchyNode,
        S: NodeStore<N> + ?Sized,
    {
        match store.get_including_deleted(node_id, scope).await? {
            None => {
                return Err(HierarchyError::NotFound {
                    kind: N::KIND,
                    id: node_id,
                })
            }
            Some(node) if node.is_deleted() => return Ok(0),
            Some(_) => {}
        }

        let deleted_at = Utc::now();
        let mut marked = 0;
        let mut stack = vec![node_id];

        while let Some(id) = stack.pop() {
            if store.mark_deleted(id, deleted_at).await? {
                marked += 1;
            }
            let children = store.children(Some(id), scope).await?;
            stack.extend(children.iter().map(N::id));
        }

        Ok(marked)
    }
}

/// Live node in `scope`, or [`HierarchyError::NotFound`].
pub(super) async fn require_live<N, S>(store: &mut S, id: DbId, scope: N::Scope) -> HierarchyResult<N>
where
    N: HierarchyNode,
    S: NodeStore<N> + ?Sized,
{
    store
        .get(id, scope)
        .await?
        .ok_or(HierarchyError::NotFound { kind: N::KIND, id })
}

/// Live parent in `scope`, locked for the rest of the transaction, or
/// [`HierarchyError::ParentNotFound`].
async fn require_parent<N, S>(store: &mut S, id: DbId, scope: N::Scope) -> HierarchyResult<N>
where
    N: HierarchyNode,
    S: NodeStore<N> + ?Sized,
{
    store
        .get_locked(id, scope)
        .await?
        .ok_or(HierarchyError::ParentNotFound { kind: N::KIND, id })
}
