//! Lookups against the `users` table.

use sqlx::PgPool;

use dropdeck_core::types::DbId;

/// Read-only helpers for users.
pub struct UserRepo;

impl UserRepo {
    /// Whether a user with this id exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
