//! Hierarchy engine for self-referential trees (decks and comment threads).
//!
//! Nodes reference their parent by id only. Every operation re-reads the
//! nodes it needs from a [`NodeStore`], so no tree state is cached between
//! calls and all checks run against whatever the caller's transaction sees.
//!
//! Components:
//!
//! - [`NodeStore`] - persistence contract, pure CRUD
//! - [`Ancestry`] - depth, ancestor chain, root and breadcrumb derivation
//! - [`OrderAllocator`] - sibling order assignment for explicitly ordered kinds
//! - [`TreeMutations`] - create / reparent / update / cascading delete
//! - [`TreeProjection`] - nested, deterministically ordered tree views
//!
//! Two kinds of node plug in through [`HierarchyNode`]: decks are partitioned
//! per owning user and ordered by an explicit `order` field, comments are
//! partitioned per drop and ordered by creation time.

mod ancestry;
mod error;
mod mutation;
mod ordering;
mod projection;
mod store;

#[cfg(test)]
pub(crate) mod memory;

use std::fmt::Debug;
use std::hash::Hash;

use crate::types::{DbId, Timestamp};

pub use ancestry::Ancestry;
pub use error::{HierarchyError, HierarchyResult};
pub use mutation::TreeMutations;
pub use ordering::{sibling_cmp, OrderAllocator};
pub use projection::{TreeProjection, TreeView};
pub use store::{NodeDraft, NodeStore, StoreError, StoreResult};

/// How siblings under the same parent are ordered when read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingOrdering {
    /// Explicit integer `order`, ties broken by creation time then id.
    Explicit,
    /// Creation timestamp, ties broken by id.
    CreatedAt,
}

/// Capability interface a node kind implements to be managed by the engine.
///
/// The engine never looks at the kind-specific payload; it only needs the
/// structural fields exposed here.
pub trait HierarchyNode: Clone + Debug + Send + Sync + 'static {
    /// Partition key of the tree this node lives in.
    type Scope: Copy + Eq + Hash + Debug + Send + Sync + 'static;
    /// Validated input needed to insert a new node.
    type Payload: Send + Sync;
    /// Non-structural field changes applied by [`TreeMutations::update`].
    type Changes: Send + Sync;

    /// Human readable kind name used in errors ("Deck", "Comment").
    const KIND: &'static str;
    const ORDERING: SiblingOrdering;

    fn id(&self) -> DbId;
    fn parent_id(&self) -> Option<DbId>;
    fn set_parent_id(&mut self, parent_id: Option<DbId>);
    fn scope(&self) -> Self::Scope;
    fn created_at(&self) -> Timestamp;
    fn is_deleted(&self) -> bool;

    /// Explicit sibling order. Only consulted for [`SiblingOrdering::Explicit`].
    fn sibling_order(&self) -> i32 {
        0
    }

    fn apply_changes(&mut self, changes: &Self::Changes);
}
