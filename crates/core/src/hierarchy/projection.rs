use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::types::DbId;

use super::mutation::require_live;
use super::{sibling_cmp, Ancestry, HierarchyError, HierarchyNode, HierarchyResult, NodeStore};

/// One node of a nested tree view, with its absolute depth.
#[derive(Debug, Clone, Serialize)]
pub struct TreeView<N> {
    #[serde(flatten)]
    pub node: N,
    pub depth: usize,
    pub children: Vec<TreeView<N>>,
}

/// Client-facing read views: nested trees, ordered child lists, breadcrumbs.
/// Only live nodes are ever included.
pub struct TreeProjection;

impl TreeProjection {
    /// A single live node, or [`HierarchyError::NotFound`].
    pub async fn node<N, S>(store: &mut S, id: DbId, scope: N::Scope) -> HierarchyResult<N>
    where
        N: HierarchyNode,
        S: NodeStore<N> + ?Sized,
    {
        require_live::<N, S>(store, id, scope).await
    }

    /// Nested forest below `root_id`, or below the scope roots when `None`.
    ///
    /// The root itself is not part of the result; its live children are the
    /// top-level entries. Siblings follow [`sibling_cmp`]. Nodes are fetched
    /// level by level from an explicit queue and assembled bottom-up, so
    /// neither step recurses.
    pub async fn subtree<N, S>(
        store: &mut S,
        root_id: Option<DbId>,
        scope: N::Scope,
    ) -> HierarchyResult<Vec<TreeView<N>>>
    where
        N: HierarchyNode,
        S: NodeStore<N> + ?Sized,
    {
        let mut visited = HashSet::new();
        let base_depth = match root_id {
            Some(id) => {
                let root = require_live::<N, S>(store, id, scope).await?;
                visited.insert(id);
                Ancestry::depth(store, &root).await? + 1
            }
            None => 0,
        };

        // Breadth-first: every node lands in `fetched` before any descendant.
        let mut fetched: Vec<(N, usize)> = Vec::new();
        let mut queue = VecDeque::from([(root_id, base_depth)]);
        while let Some((parent_id, depth)) = queue.pop_front() {
            let mut children = store.children(parent_id, scope).await?;
            children.sort_by(sibling_cmp);
            for child in children {
                if !visited.insert(child.id()) {
                    return Err(HierarchyError::CorruptHierarchy {
                        kind: N::KIND,
                        id: child.id(),
                    });
                }
                queue.push_back((Some(child.id()), depth + 1));
                fetched.push((child, depth));
            }
        }

        // Walking backwards, each node's children are already built. Siblings
        // arrive in reverse and are flipped when their parent is assembled.
        let mut built: HashMap<Option<DbId>, Vec<TreeView<N>>> = HashMap::new();
        for (node, depth) in fetched.into_iter().rev() {
            let mut children = built.remove(&Some(node.id())).unwrap_or_default();
            children.reverse();
            built.entry(node.parent_id()).or_default().push(TreeView {
                node,
                depth,
                children,
            });
        }

        let mut top = built.remove(&root_id).unwrap_or_default();
        top.reverse();
        Ok(top)
    }

    /// Live direct children of `parent_id` (scope roots when `None`) in
    /// canonical sibling order. The parent, if given, must be live.
    pub async fn children<N, S>(
        store: &mut S,
        parent_id: Option<DbId>,
        scope: N::Scope,
    ) -> HierarchyResult<Vec<N>>
    where
        N: HierarchyNode,
        S: NodeStore<N> + ?Sized,
    {
        if let Some(id) = parent_id {
            require_live::<N, S>(store, id, scope).await?;
        }
        let mut children = store.children(parent_id, scope).await?;
        children.sort_by(sibling_cmp);
        Ok(children)
    }

    /// Root-to-node path, the node itself last.
    pub async fn breadcrumb<N, S>(store: &mut S, node: &N) -> HierarchyResult<Vec<N>>
    where
        N: HierarchyNode,
        S: NodeStore<N> + ?Sized,
    {
        let mut trail = Ancestry::ancestors(store, node).await?;
        trail.push(node.clone());
        Ok(trail)
    }
}
