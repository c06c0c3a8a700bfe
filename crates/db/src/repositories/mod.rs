//! Repository layer.
//!
//! [`DeckStore`] and [`CommentStore`] implement the hierarchy engine's
//! `NodeStore` over a borrowed `&mut PgConnection`, so the same code runs on
//! a pooled connection for reads or inside a transaction for writes.
//! [`DropRepo`] and [`UserRepo`] are zero-sized lookup helpers.

pub mod comment_repo;
pub mod deck_repo;
pub mod drop_repo;
pub mod user_repo;

pub use comment_repo::CommentStore;
pub use deck_repo::DeckStore;
pub use drop_repo::DropRepo;
pub use user_repo::UserRepo;

use dropdeck_core::hierarchy::StoreError;

/// Wrap a sqlx failure with a short description of the operation.
fn store_error(context: impl Into<String>) -> impl FnOnce(sqlx::Error) -> StoreError {
    let context = context.into();
    move |err| StoreError::new(context, err)
}
