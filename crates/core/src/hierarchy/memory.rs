//! In-memory [`NodeStore`] and two test node kinds, one per ordering
//! strategy. Test-only.

use std::collections::BTreeMap;
use std::io;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use crate::types::{DbId, Timestamp};

use super::{HierarchyNode, NodeDraft, NodeStore, SiblingOrdering, StoreError, StoreResult};

// ---------------------------------------------------------------------------
// Node kinds
// ---------------------------------------------------------------------------

/// Folder-like node: scoped by owner, explicitly ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub id: DbId,
    pub owner_id: DbId,
    pub parent_id: Option<DbId>,
    pub name: String,
    pub order: i32,
    pub created_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

#[derive(Debug, Default)]
pub struct FolderChanges {
    pub name: Option<String>,
    pub order: Option<i32>,
}

impl HierarchyNode for Folder {
    type Scope = DbId;
    type Payload = String;
    type Changes = FolderChanges;

    const KIND: &'static str = "Folder";
    const ORDERING: SiblingOrdering = SiblingOrdering::Explicit;

    fn id(&self) -> DbId {
        self.id
    }
    fn parent_id(&self) -> Option<DbId> {
        self.parent_id
    }
    fn set_parent_id(&mut self, parent_id: Option<DbId>) {
        self.parent_id = parent_id;
    }
    fn scope(&self) -> DbId {
        self.owner_id
    }
    fn created_at(&self) -> Timestamp {
        self.created_at
    }
    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
    fn sibling_order(&self) -> i32 {
        self.order
    }
    fn apply_changes(&mut self, changes: &FolderChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(order) = changes.order {
            self.order = order;
        }
    }
}

/// Reply-like node: scoped by thread, ordered by creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub id: DbId,
    pub thread_id: DbId,
    pub parent_id: Option<DbId>,
    pub body: String,
    pub created_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl HierarchyNode for Reply {
    type Scope = DbId;
    type Payload = String;
    type Changes = String;

    const KIND: &'static str = "Reply";
    const ORDERING: SiblingOrdering = SiblingOrdering::CreatedAt;

    fn id(&self) -> DbId {
        self.id
    }
    fn parent_id(&self) -> Option<DbId> {
        self.parent_id
    }
    fn set_parent_id(&mut self, parent_id: Option<DbId>) {
        self.parent_id = parent_id;
    }
    fn scope(&self) -> DbId {
        self.thread_id
    }
    fn created_at(&self) -> Timestamp {
        self.created_at
    }
    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
    fn apply_changes(&mut self, body: &String) {
        self.body = body.clone();
    }
}

/// Row construction and soft-delete bookkeeping the in-memory store needs.
pub trait MemoryRow: HierarchyNode<Payload = String> {
    fn from_draft(id: DbId, draft: NodeDraft<'_, Self>, created_at: Timestamp) -> Self;
    fn set_deleted_at(&mut self, at: Timestamp);
}

impl MemoryRow for Folder {
    fn from_draft(id: DbId, draft: NodeDraft<'_, Self>, created_at: Timestamp) -> Self {
        Folder {
            id,
            owner_id: draft.scope,
            parent_id: draft.parent_id,
            name: draft.payload.clone(),
            order: draft.order.unwrap_or_default(),
            created_at,
            deleted_at: None,
        }
    }
    fn set_deleted_at(&mut self, at: Timestamp) {
        self.deleted_at = Some(at);
    }
}

impl MemoryRow for Reply {
    fn from_draft(id: DbId, draft: NodeDraft<'_, Self>, created_at: Timestamp) -> Self {
        Reply {
            id,
            thread_id: draft.scope,
            parent_id: draft.parent_id,
            body: draft.payload.clone(),
            created_at,
            deleted_at: None,
        }
    }
    fn set_deleted_at(&mut self, at: Timestamp) {
        self.deleted_at = Some(at);
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Map-backed store. Ids are sequential from 1; each insert is stamped one
/// second after the previous so creation order is deterministic.
pub struct MemoryStore<N> {
    rows: BTreeMap<DbId, N>,
    next_id: DbId,
    /// Number of `mark_deleted` calls allowed to succeed before every later
    /// call fails. `None` never fails.
    pub fail_mark_deleted_after: Option<usize>,
    mark_deleted_calls: usize,
    /// Ids read through `get_locked`, in call order.
    pub locked: Vec<DbId>,
}

impl<N: MemoryRow> MemoryStore<N> {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
            fail_mark_deleted_after: None,
            mark_deleted_calls: 0,
            locked: Vec::new(),
        }
    }

    /// Raw row access, bypassing all filtering.
    pub fn row(&self, id: DbId) -> &N {
        &self.rows[&id]
    }

    /// Raw mutable row access, used to fabricate states the engine would
    /// never produce (e.g. a stored cycle).
    pub fn row_mut(&mut self, id: DbId) -> &mut N {
        self.rows.get_mut(&id).expect("row exists")
    }

    pub fn live_count(&self) -> usize {
        self.rows.values().filter(|n| !n.is_deleted()).count()
    }

    fn base_time() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }
}

#[async_trait]
impl<N: MemoryRow> NodeStore<N> for MemoryStore<N> {
    async fn get(&mut self, id: DbId, scope: N::Scope) -> StoreResult<Option<N>> {
        Ok(self
            .rows
            .get(&id)
            .filter(|n| n.scope() == scope && !n.is_deleted())
            .cloned())
    }

    async fn get_locked(&mut self, id: DbId, scope: N::Scope) -> StoreResult<Option<N>> {
        self.locked.push(id);
        self.get(id, scope).await
    }

    async fn get_including_deleted(
        &mut self,
        id: DbId,
        scope: N::Scope,
    ) -> StoreResult<Option<N>> {
        Ok(self.rows.get(&id).filter(|n| n.scope() == scope).cloned())
    }

    async fn children(&mut self, parent_id: Option<DbId>, scope: N::Scope) -> StoreResult<Vec<N>> {
        // Reverse id order so callers cannot accidentally rely on insertion order.
        Ok(self
            .rows
            .values()
            .rev()
            .filter(|n| n.parent_id() == parent_id && n.scope() == scope && !n.is_deleted())
            .cloned()
            .collect())
    }

    async fn create(&mut self, draft: NodeDraft<'_, N>) -> StoreResult<N> {
        let id = self.next_id;
        self.next_id += 1;
        let created_at = Self::base_time() + Duration::seconds(id);
        let node = N::from_draft(id, draft, created_at);
        self.rows.insert(id, node.clone());
        Ok(node)
    }

    async fn save(&mut self, node: &N) -> StoreResult<N> {
        match self.rows.get_mut(&node.id()) {
            Some(row) if !row.is_deleted() => {
                *row = node.clone();
                Ok(node.clone())
            }
            _ => Err(StoreError::new(
                format!("save {}", node.id()),
                io::Error::new(io::ErrorKind::NotFound, "row missing or deleted"),
            )),
        }
    }

    async fn mark_deleted(&mut self, id: DbId, at: Timestamp) -> StoreResult<bool> {
        if let Some(limit) = self.fail_mark_deleted_after {
            if self.mark_deleted_calls >= limit {
                return Err(StoreError::new(
                    format!("mark_deleted {id}"),
                    io::Error::new(io::ErrorKind::ConnectionReset, "store went away"),
                ));
            }
        }
        self.mark_deleted_calls += 1;

        match self.rows.get_mut(&id) {
            Some(row) if !row.is_deleted() => {
                row.set_deleted_at(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
