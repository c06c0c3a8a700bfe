//! Storage for the `decks` table.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgConnection;

use dropdeck_core::hierarchy::{NodeDraft, NodeStore, StoreResult};
use dropdeck_core::types::{DbId, Timestamp};

use super::store_error;
use crate::models::deck::Deck;

/// Column list for decks queries.
const COLUMNS: &str = "id, user_id, parent_id, name, description, color_hex, \
    sort_order, is_public, deleted_at, created_at, updated_at";

/// Deck persistence scoped by owning user.
pub struct DeckStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> DeckStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Number of live children per deck, for the given parents. Parents
    /// without live children are absent from the map.
    pub async fn live_child_counts(
        &mut self,
        parent_ids: &[DbId],
        user_id: DbId,
    ) -> Result<HashMap<DbId, i64>, sqlx::Error> {
        let rows: Vec<(DbId, i64)> = sqlx::query_as(
            "SELECT parent_id, COUNT(*) FROM decks
             WHERE user_id = $1 AND parent_id = ANY($2) AND deleted_at IS NULL
             GROUP BY parent_id",
        )
        .bind(user_id)
        .bind(parent_ids)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows.into_iter().collect())
    }
}

#[async_trait]
impl<'c> NodeStore<Deck> for DeckStore<'c> {
    async fn get(&mut self, id: DbId, user_id: DbId) -> StoreResult<Option<Deck>> {
        let query = format!(
            "SELECT {COLUMNS} FROM decks
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Deck>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(store_error(format!("load deck {id}")))
    }

    async fn get_locked(&mut self, id: DbId, user_id: DbId) -> StoreResult<Option<Deck>> {
        let query = format!(
            "SELECT {COLUMNS} FROM decks
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
             FOR SHARE"
        );
        sqlx::query_as::<_, Deck>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(store_error(format!("lock deck {id}")))
    }

    async fn get_including_deleted(
        &mut self,
        id: DbId,
        user_id: DbId,
    ) -> StoreResult<Option<Deck>> {
        let query = format!("SELECT {COLUMNS} FROM decks WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Deck>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(store_error(format!("load deck {id} including deleted")))
    }

    async fn children(&mut self, parent_id: Option<DbId>, user_id: DbId) -> StoreResult<Vec<Deck>> {
        // Separate statements so both cases can use the (user_id, parent_id) index.
        let result = match parent_id {
            Some(parent_id) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM decks
                     WHERE user_id = $1 AND parent_id = $2 AND deleted_at IS NULL"
                );
                sqlx::query_as::<_, Deck>(&query)
                    .bind(user_id)
                    .bind(parent_id)
                    .fetch_all(&mut *self.conn)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM decks
                     WHERE user_id = $1 AND parent_id IS NULL AND deleted_at IS NULL"
                );
                sqlx::query_as::<_, Deck>(&query)
                    .bind(user_id)
                    .fetch_all(&mut *self.conn)
                    .await
            }
        };
        result.map_err(store_error(format!("list children of deck {parent_id:?}")))
    }

    async fn create(&mut self, draft: NodeDraft<'_, Deck>) -> StoreResult<Deck> {
        let query = format!(
            "INSERT INTO decks
                (user_id, parent_id, name, description, color_hex, sort_order, is_public)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deck>(&query)
            .bind(draft.scope)
            .bind(draft.parent_id)
            .bind(&draft.payload.name)
            .bind(&draft.payload.description)
            .bind(&draft.payload.color_hex)
            .bind(draft.order.unwrap_or_default())
            .bind(draft.payload.is_public)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(store_error("insert deck"))
    }

    async fn save(&mut self, deck: &Deck) -> StoreResult<Deck> {
        let query = format!(
            "UPDATE decks SET
                parent_id = $1,
                name = $2,
                description = $3,
                color_hex = $4,
                sort_order = $5,
                is_public = $6,
                updated_at = NOW()
             WHERE id = $7 AND user_id = $8 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deck>(&query)
            .bind(deck.parent_id)
            .bind(&deck.name)
            .bind(&deck.description)
            .bind(&deck.color_hex)
            .bind(deck.sort_order)
            .bind(deck.is_public)
            .bind(deck.id)
            .bind(deck.user_id)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(store_error(format!("save deck {}", deck.id)))
    }

    async fn mark_deleted(&mut self, id: DbId, at: Timestamp) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE decks SET deleted_at = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&mut *self.conn)
        .await
        .map_err(store_error(format!("soft delete deck {id}")))?;
        Ok(result.rows_affected() > 0)
    }
}
