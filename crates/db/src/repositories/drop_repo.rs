//! Lookups against the `drops` table. Drops themselves are managed elsewhere;
//! comment threads only need to know whether one is live.

use sqlx::PgConnection;

use dropdeck_core::types::DbId;

/// Read-only helpers for drops.
pub struct DropRepo;

impl DropRepo {
    /// Whether a drop with this id exists and is not soft-deleted.
    pub async fn is_live(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM drops WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(conn)
        .await?;
        Ok(row.0)
    }
}
