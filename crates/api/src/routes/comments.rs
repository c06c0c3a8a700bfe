//! Route definitions for comment threads (mounted at `/drops`).
//!
//! ```text
//! GET    /{drop_id}/comments                   list_comments
//! POST   /{drop_id}/comments                   create_comment
//! GET    /{drop_id}/comments/tree              get_comment_tree
//! GET    /{drop_id}/comments/{id}              get_comment
//! PUT    /{drop_id}/comments/{id}              update_comment
//! DELETE /{drop_id}/comments/{id}              delete_comment
//! GET    /{drop_id}/comments/{id}/replies      get_replies
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::comments;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{drop_id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/{drop_id}/comments/tree", get(comments::get_comment_tree))
        .route(
            "/{drop_id}/comments/{id}",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route(
            "/{drop_id}/comments/{id}/replies",
            get(comments::get_replies),
        )
}
