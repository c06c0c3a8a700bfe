//! Comment models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use dropdeck_core::comment::normalize_comment_content;
use dropdeck_core::error::CoreError;
use dropdeck_core::hierarchy::{HierarchyNode, SiblingOrdering};
use dropdeck_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A comment row from the `comments` table, with its author's username.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: DbId,
    pub drop_id: DbId,
    pub author_id: DbId,
    pub user_name: String,
    pub parent_id: Option<DbId>,
    pub content: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl HierarchyNode for Comment {
    type Scope = DbId;
    type Payload = NewComment;
    type Changes = UpdateComment;

    const KIND: &'static str = "Comment";
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

    /// Threads are partitioned per drop.
    fn scope(&self) -> DbId {
        self.drop_id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    fn apply_changes(&mut self, changes: &UpdateComment) {
        self.content = changes.content.clone();
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Request body for posting a comment, optionally as a reply.
#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub content: String,
    pub parent_id: Option<DbId>,
}

/// Validated comment payload ready for insertion.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub author_id: DbId,
    pub content: String,
}

impl NewComment {
    pub fn new(author_id: DbId, input: &CreateComment) -> Result<Self, CoreError> {
        Ok(Self {
            author_id,
            content: normalize_comment_content(&input.content)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// Request body for editing a comment. Only the content can change.
#[derive(Debug, Deserialize)]
pub struct UpdateComment {
    pub content: String,
}

impl UpdateComment {
    pub fn validated(self) -> Result<Self, CoreError> {
        Ok(Self {
            content: normalize_comment_content(&self.content)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A comment as listed, with the number of live direct replies.
#[derive(Debug, Serialize)]
pub struct CommentSummary {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies_count: i64,
}
