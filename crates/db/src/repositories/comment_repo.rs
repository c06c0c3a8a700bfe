//! Storage for the `comments` table.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgConnection;

use dropdeck_core::hierarchy::{NodeDraft, NodeStore, StoreResult};
use dropdeck_core::types::{DbId, Timestamp};

use super::store_error;
use crate::models::comment::Comment;

/// Column list for comments queries, read from `comments c` joined with
/// the author as `users u`.
const COLUMNS: &str = "c.id, c.drop_id, c.author_id, u.username AS user_name, c.parent_id, \
    c.content, c.deleted_at, c.created_at, c.updated_at";

/// Comment rows with their author's name.
const FROM: &str = "comments c JOIN users u ON u.id = c.author_id";

/// Comment persistence scoped by drop.
pub struct CommentStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> CommentStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Number of live direct replies per comment, for the given parents.
    /// Comments without live replies are absent from the map.
    pub async fn live_reply_counts(
        &mut self,
        parent_ids: &[DbId],
        drop_id: DbId,
    ) -> Result<HashMap<DbId, i64>, sqlx::Error> {
        let rows: Vec<(DbId, i64)> = sqlx::query_as(
            "SELECT parent_id, COUNT(*) FROM comments
             WHERE drop_id = $1 AND parent_id = ANY($2) AND deleted_at IS NULL
             GROUP BY parent_id",
        )
        .bind(drop_id)
        .bind(parent_ids)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows.into_iter().collect())
    }
}

#[async_trait]
impl<'c> NodeStore<Comment> for CommentStore<'c> {
    async fn get(&mut self, id: DbId, drop_id: DbId) -> StoreResult<Option<Comment>> {
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM}
             WHERE c.id = $1 AND c.drop_id = $2 AND c.deleted_at IS NULL"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(drop_id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(store_error(format!("load comment {id}")))
    }

    async fn get_locked(&mut self, id: DbId, drop_id: DbId) -> StoreResult<Option<Comment>> {
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM}
             WHERE c.id = $1 AND c.drop_id = $2 AND c.deleted_at IS NULL
             FOR SHARE OF c"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(drop_id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(store_error(format!("lock comment {id}")))
    }

    async fn get_including_deleted(
        &mut self,
        id: DbId,
        drop_id: DbId,
    ) -> StoreResult<Option<Comment>> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE c.id = $1 AND c.drop_id = $2");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(drop_id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(store_error(format!("load comment {id} including deleted")))
    }

    async fn children(
        &mut self,
        parent_id: Option<DbId>,
        drop_id: DbId,
    ) -> StoreResult<Vec<Comment>> {
        let result = match parent_id {
            Some(parent_id) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM {FROM}
                     WHERE c.drop_id = $1 AND c.parent_id = $2 AND c.deleted_at IS NULL"
                );
                sqlx::query_as::<_, Comment>(&query)
                    .bind(drop_id)
                    .bind(parent_id)
                    .fetch_all(&mut *self.conn)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM {FROM}
                     WHERE c.drop_id = $1 AND c.parent_id IS NULL AND c.deleted_at IS NULL"
                );
                sqlx::query_as::<_, Comment>(&query)
                    .bind(drop_id)
                    .fetch_all(&mut *self.conn)
                    .await
            }
        };
        result.map_err(store_error(format!("list replies to comment {parent_id:?}")))
    }

    async fn create(&mut self, draft: NodeDraft<'_, Comment>) -> StoreResult<Comment> {
        let query = format!(
            "WITH c AS (
                INSERT INTO comments (drop_id, author_id, parent_id, content)
                VALUES ($1, $2, $3, $4)
                RETURNING *
             )
             SELECT {COLUMNS} FROM c JOIN users u ON u.id = c.author_id"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(draft.scope)
            .bind(draft.payload.author_id)
            .bind(draft.parent_id)
            .bind(&draft.payload.content)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(store_error("insert comment"))
    }

    async fn save(&mut self, comment: &Comment) -> StoreResult<Comment> {
        let query = format!(
            "WITH c AS (
                UPDATE comments SET
                    parent_id = $1,
                    content = $2,
                    updated_at = NOW()
                WHERE id = $3 AND drop_id = $4 AND deleted_at IS NULL
                RETURNING *
             )
             SELECT {COLUMNS} FROM c JOIN users u ON u.id = c.author_id"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(comment.parent_id)
            .bind(&comment.content)
            .bind(comment.id)
            .bind(comment.drop_id)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(store_error(format!("save comment {}", comment.id)))
    }

    async fn mark_deleted(&mut self, id: DbId, at: Timestamp) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE comments SET deleted_at = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&mut *self.conn)
        .await
        .map_err(store_error(format!("soft delete comment {id}")))?;
        Ok(result.rows_affected() > 0)
    }
}
