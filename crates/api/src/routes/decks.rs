//! Route definitions for decks (mounted at `/decks`).
//!
//! ```text
//! GET    /                      list_decks (?parent_id)
//! POST   /                      create_deck
//! GET    /tree                  get_deck_tree (?root_id)
//! GET    /{id}                  get_deck
//! PUT    /{id}                  update_deck
//! DELETE /{id}                  delete_deck
//! POST   /{id}/move             move_deck
//! GET    /{id}/breadcrumb       get_breadcrumb
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::decks;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(decks::list_decks).post(decks::create_deck))
        .route("/tree", get(decks::get_deck_tree))
        .route(
            "/{id}",
            get(decks::get_deck)
                .put(decks::update_deck)
                .delete(decks::delete_deck),
        )
        .route("/{id}/move", post(decks::move_deck))
        .route("/{id}/breadcrumb", get(decks::get_breadcrumb))
}
