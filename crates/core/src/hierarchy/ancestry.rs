use std::collections::{HashSet, VecDeque};

use super::{HierarchyError, HierarchyNode, HierarchyResult, NodeStore};

/// Read-only derivations over the parent chain of a node.
///
/// Walks stop at the first parent that is missing, soft-deleted or outside
/// the node's scope, treating the last node reached as the root. Revisiting
/// a node aborts with [`HierarchyError::CorruptHierarchy`].
pub struct Ancestry;

impl Ancestry {
    /// Ancestors of `node`, root first and immediate parent last. Empty for a root.
    pub async fn ancestors<N, S>(store: &mut S, node: &N) -> HierarchyResult<Vec<N>>
    where
        N: HierarchyNode,
        S: NodeStore<N> + ?Sized,
    {
        let scope = node.scope();
        let mut chain = VecDeque::new();
        let mut visited = HashSet::from([node.id()]);
        let mut next = node.parent_id();

        while let Some(parent_id) = next {
            let Some(parent) = store.get(parent_id, scope).await? else {
                break;
            };
            if !visited.insert(parent.id()) {
                return Err(HierarchyError::CorruptHierarchy {
                    kind: N::KIND,
                    id: parent.id(),
                });
            }
            next = parent.parent_id();
            chain.push_front(parent);
        }

        Ok(chain.into())
    }

    /// Hops from `node` to its root. A root has depth 0.
    pub async fn depth<N, S>(store: &mut S, node: &N) -> HierarchyResult<usize>
    where
        N: HierarchyNode,
        S: NodeStore<N> + ?Sized,
    {
        Ok(Self::ancestors(store, node).await?.len())
    }

    /// The topmost live ancestor, or `node` itself when it is a root.
    pub async fn root<N, S>(store: &mut S, node: &N) -> HierarchyResult<N>
    where
        N: HierarchyNode,
        S: NodeStore<N> + ?Sized,
    {
        let ancestors = Self::ancestors(store, node).await?;
        Ok(ancestors
            .into_iter()
            .next()
            .unwrap_or_else(|| node.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::memory::{Folder, MemoryStore};
    use crate::hierarchy::TreeMutations;
    use crate::types::DbId;
    use assert_matches::assert_matches;

    const OWNER: DbId = 1;

    /// Builds root -> d1 -> d2 -> leaf and returns the four nodes in that order.
    async fn chain(store: &mut MemoryStore<Folder>) -> [Folder; 4] {
        let root = TreeMutations::create(store, OWNER, None, &"root".to_string())
            .await
            .unwrap();
        let d1 = TreeMutations::create(store, OWNER, Some(root.id), &"d1".to_string())
            .await
            .unwrap();
        let d2 = TreeMutations::create(store, OWNER, Some(d1.id), &"d2".to_string())
            .await
            .unwrap();
        let leaf = TreeMutations::create(store, OWNER, Some(d2.id), &"leaf".to_string())
            .await
            .unwrap();
        [root, d1, d2, leaf]
    }

    fn ids(nodes: &[Folder]) -> Vec<DbId> {
        nodes.iter().map(|n| n.id).collect()
    }

    #[tokio::test]
    async fn root_has_depth_zero_and_no_ancestors() {
        let mut store = MemoryStore::new();
        let [root, ..] = chain(&mut store).await;

        assert_eq!(Ancestry::depth(&mut store, &root).await.unwrap(), 0);
        assert!(Ancestry::ancestors(&mut store, &root).await.unwrap().is_empty());
        assert_eq!(Ancestry::root(&mut store, &root).await.unwrap().id, root.id);
    }

    #[tokio::test]
    async fn ancestors_are_root_first() {
        let mut store = MemoryStore::new();
        let [root, d1, d2, leaf] = chain(&mut store).await;

        let ancestors = Ancestry::ancestors(&mut store, &leaf).await.unwrap();
        assert_eq!(ids(&ancestors), vec![root.id, d1.id, d2.id]);
        assert_eq!(Ancestry::depth(&mut store, &leaf).await.unwrap(), 3);
        assert_eq!(Ancestry::root(&mut store, &leaf).await.unwrap().id, root.id);
    }

    #[tokio::test]
    async fn missing_parent_is_treated_as_root() {
        let mut store = MemoryStore::new();
        let [_, d1, d2, leaf] = chain(&mut store).await;
        store.row_mut(d1.id).parent_id = Some(9_999);

        let ancestors = Ancestry::ancestors(&mut store, &leaf).await.unwrap();
        assert_eq!(ids(&ancestors), vec![d1.id, d2.id]);
    }

    #[tokio::test]
    async fn parent_in_other_scope_is_treated_as_root() {
        let mut store = MemoryStore::new();
        let [_, d1, d2, leaf] = chain(&mut store).await;
        let foreign = TreeMutations::create(&mut store, OWNER + 1, None, &"foreign".to_string())
            .await
            .unwrap();
        store.row_mut(d1.id).parent_id = Some(foreign.id);

        let ancestors = Ancestry::ancestors(&mut store, &leaf).await.unwrap();
        assert!(!ids(&ancestors).contains(&foreign.id));
        assert_eq!(Ancestry::root(&mut store, &leaf).await.unwrap().id, d1.id);
        assert_eq!(Ancestry::depth(&mut store, &d2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn stored_cycle_is_reported_not_looped() {
        let mut store = MemoryStore::new();
        let [root, _, d2, leaf] = chain(&mut store).await;
        // Fabricate root -> d2 so that root -> d1 -> d2 -> root loops.
        store.row_mut(root.id).parent_id = Some(d2.id);

        let result = Ancestry::ancestors(&mut store, &leaf).await;
        assert_matches!(result, Err(HierarchyError::CorruptHierarchy { kind: "Folder", .. }));
    }

    #[tokio::test]
    async fn self_loop_is_reported() {
        let mut store = MemoryStore::new();
        let [root, ..] = chain(&mut store).await;
        store.row_mut(root.id).parent_id = Some(root.id);
        let looped = store.row(root.id).clone();

        let result = Ancestry::depth(&mut store, &looped).await;
        assert_matches!(result, Err(HierarchyError::CorruptHierarchy { id, .. }) if id == root.id);
    }
}
