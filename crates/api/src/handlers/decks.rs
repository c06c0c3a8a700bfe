//! Handlers for the deck hierarchy.
//!
//! Reads run on a pooled connection; every mutation runs in its own
//! transaction, committed only after the engine succeeds. Moves use
//! `SERIALIZABLE` isolation so concurrent cross-moves cannot both commit.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use dropdeck_core::hierarchy::{Ancestry, TreeMutations, TreeProjection};
use dropdeck_core::types::DbId;
use dropdeck_db::models::deck::{
    BreadcrumbEntry, CreateDeck, Deck, DeckDetail, DeckListParams, DeckSummary, DeckTreeParams,
    MoveDeck, NewDeck, UpdateDeck,
};
use dropdeck_db::repositories::DeckStore;

use crate::error::AppResult;
use crate::middleware::acting_user::ActingUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Attach `depth` (shared by all siblings) and live child counts.
async fn summarize(
    store: &mut DeckStore<'_>,
    decks: Vec<Deck>,
    depth: usize,
    user_id: DbId,
) -> AppResult<Vec<DeckSummary>> {
    let ids: Vec<DbId> = decks.iter().map(|deck| deck.id).collect();
    let counts = store.live_child_counts(&ids, user_id).await?;

    Ok(decks
        .into_iter()
        .map(|deck| DeckSummary {
            children_count: counts.get(&deck.id).copied().unwrap_or(0),
            depth,
            deck,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// GET /decks
// ---------------------------------------------------------------------------

/// List the live children of `parent_id` (root decks when absent), in order,
/// each with its depth and child count.
pub async fn list_decks(
    State(state): State<AppState>,
    user: ActingUser,
    Query(params): Query<DeckListParams>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let mut store = DeckStore::new(&mut conn);

    let depth = match params.parent_id {
        Some(parent_id) => {
            let parent: Deck = TreeProjection::node(&mut store, parent_id, user.user_id).await?;
            Ancestry::depth(&mut store, &parent).await? + 1
        }
        None => 0,
    };
    let children =
        TreeProjection::children::<Deck, _>(&mut store, params.parent_id, user.user_id).await?;
    let decks = summarize(&mut store, children, depth, user.user_id).await?;

    tracing::debug!(
        count = decks.len(),
        user_id = user.user_id,
        parent_id = ?params.parent_id,
        "Listed decks"
    );

    Ok(Json(DataResponse { data: decks }))
}

// ---------------------------------------------------------------------------
// POST /decks
// ---------------------------------------------------------------------------

/// Create a deck, appended after its siblings.
pub async fn create_deck(
    State(state): State<AppState>,
    user: ActingUser,
    Json(body): Json<CreateDeck>,
) -> AppResult<impl IntoResponse> {
    let payload = NewDeck::try_from(&body)?;

    let mut tx = state.pool.begin().await?;
    let deck: Deck = TreeMutations::create(
        &mut DeckStore::new(&mut tx),
        user.user_id,
        body.parent_id,
        &payload,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        deck_id = deck.id,
        user_id = user.user_id,
        parent_id = ?deck.parent_id,
        order = deck.sort_order,
        "Deck created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: deck })))
}

// ---------------------------------------------------------------------------
// GET /decks/tree
// ---------------------------------------------------------------------------

/// Nested tree of the caller's decks, optionally below `root_id`.
pub async fn get_deck_tree(
    State(state): State<AppState>,
    user: ActingUser,
    Query(params): Query<DeckTreeParams>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let tree = TreeProjection::subtree::<Deck, _>(
        &mut DeckStore::new(&mut conn),
        params.root_id,
        user.user_id,
    )
    .await?;

    Ok(Json(DataResponse { data: tree }))
}

// ---------------------------------------------------------------------------
// GET /decks/{id}
// ---------------------------------------------------------------------------

/// A deck with its depth, breadcrumb and direct children.
pub async fn get_deck(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let mut store = DeckStore::new(&mut conn);

    let deck: Deck = TreeProjection::node(&mut store, id, user.user_id).await?;
    let trail = TreeProjection::breadcrumb(&mut store, &deck).await?;
    let children = TreeProjection::children::<Deck, _>(&mut store, Some(id), user.user_id).await?;
    let depth = trail.len() - 1;
    let children = summarize(&mut store, children, depth + 1, user.user_id).await?;

    let detail = DeckDetail {
        depth,
        children_count: children.len(),
        breadcrumb: trail.iter().map(BreadcrumbEntry::from).collect(),
        children,
        deck,
    };

    Ok(Json(DataResponse { data: detail }))
}

// ---------------------------------------------------------------------------
// PUT /decks/{id}
// ---------------------------------------------------------------------------

/// Update name, description, color, visibility or order.
pub async fn update_deck(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateDeck>,
) -> AppResult<impl IntoResponse> {
    let changes = body.validated()?;

    let mut tx = state.pool.begin().await?;
    let deck: Deck =
        TreeMutations::update(&mut DeckStore::new(&mut tx), id, user.user_id, &changes).await?;
    tx.commit().await?;

    tracing::info!(deck_id = id, user_id = user.user_id, "Deck updated");

    Ok(Json(DataResponse { data: deck }))
}

// ---------------------------------------------------------------------------
// POST /decks/{id}/move
// ---------------------------------------------------------------------------

/// Reparent a deck, rejecting moves that would create a cycle.
pub async fn move_deck(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<DbId>,
    Json(body): Json<MoveDeck>,
) -> AppResult<impl IntoResponse> {
    let mut tx = dropdeck_db::begin_serializable(&state.pool).await?;
    let deck: Deck = TreeMutations::reparent(
        &mut DeckStore::new(&mut tx),
        id,
        body.parent_id,
        user.user_id,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        deck_id = id,
        user_id = user.user_id,
        parent_id = ?body.parent_id,
        "Deck moved"
    );

    Ok(Json(DataResponse { data: deck }))
}

// ---------------------------------------------------------------------------
// GET /decks/{id}/breadcrumb
// ---------------------------------------------------------------------------

/// Root-to-deck path as `{id, name}` pairs.
pub async fn get_breadcrumb(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let mut store = DeckStore::new(&mut conn);

    let deck: Deck = TreeProjection::node(&mut store, id, user.user_id).await?;
    let trail: Vec<BreadcrumbEntry> = TreeProjection::breadcrumb(&mut store, &deck)
        .await?
        .iter()
        .map(BreadcrumbEntry::from)
        .collect();

    Ok(Json(DataResponse { data: trail }))
}

// ---------------------------------------------------------------------------
// DELETE /decks/{id}
// ---------------------------------------------------------------------------

/// Soft-delete a deck and its whole subtree.
///
/// Deleting an already-deleted deck succeeds without changes.
pub async fn delete_deck(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let mut tx = state.pool.begin().await?;
    let deleted =
        TreeMutations::delete::<Deck, _>(&mut DeckStore::new(&mut tx), id, user.user_id).await?;
    tx.commit().await?;

    tracing::info!(deck_id = id, user_id = user.user_id, deleted, "Deck deleted");

    Ok(StatusCode::NO_CONTENT)
}
