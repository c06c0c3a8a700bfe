pub mod comments;
pub mod decks;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /decks                     deck hierarchy (list, create, tree, detail,
///                            update, move, breadcrumb, delete)
/// /drops/{drop_id}/comments  comment threads (list, create, tree, replies,
///                            update, delete)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/decks", decks::router())
        .nest("/drops", comments::router())
}
