use std::cmp::Ordering;

use crate::types::DbId;

use super::{HierarchyNode, HierarchyResult, NodeStore, SiblingOrdering};

/// Canonical sibling order for a node kind.
///
/// Explicit kinds sort by `(order, created_at, id)`; creation-time kinds by
/// `(created_at, id)`. Duplicate `order` values are expected and resolved by
/// the secondary keys, so the result is total and deterministic.
pub fn sibling_cmp<N: HierarchyNode>(a: &N, b: &N) -> Ordering {
    let by_time = a
        .created_at()
        .cmp(&b.created_at())
        .then_with(|| a.id().cmp(&b.id()));

    match N::ORDERING {
        SiblingOrdering::Explicit => a.sibling_order().cmp(&b.sibling_order()).then(by_time),
        SiblingOrdering::CreatedAt => by_time,
    }
}

/// Assigns `order` values to new children of explicitly ordered kinds.
pub struct OrderAllocator;

impl OrderAllocator {
    /// `max(order of live siblings) + 1`, or `0` for the first child.
    ///
    /// Values are never compacted, so gaps left by deleted or moved siblings
    /// are normal. Only live siblings count, so the value of a deleted
    /// highest sibling is handed out again.
    pub async fn next_order<N, S>(
        store: &mut S,
        parent_id: Option<DbId>,
        scope: N::Scope,
    ) -> HierarchyResult<i32>
    where
        N: HierarchyNode,
        S: NodeStore<N> + ?Sized,
    {
        let siblings = store.children(parent_id, scope).await?;
        Ok(siblings
            .iter()
            .map(N::sibling_order)
            .max()
            .map_or(0, |max| max.saturating_add(1)))
    }
}
