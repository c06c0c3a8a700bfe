//! Handlers for threaded comments on drops.
//!
//! Every endpoint first checks that the drop is live. Edits and deletes are
//! restricted to the comment's author.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use sqlx::PgConnection;

use dropdeck_core::comment::ensure_author;
use dropdeck_core::error::CoreError;
use dropdeck_core::hierarchy::{HierarchyError, NodeStore, TreeMutations, TreeProjection};
use dropdeck_core::types::DbId;
use dropdeck_db::models::comment::{
    Comment, CommentSummary, CreateComment, NewComment, UpdateComment,
};
use dropdeck_db::repositories::{CommentStore, DropRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::acting_user::ActingUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_drop_live(conn: &mut PgConnection, drop_id: DbId) -> AppResult<()> {
    if !DropRepo::is_live(conn, drop_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Drop",
            id: drop_id,
        }));
    }
    Ok(())
}

/// Load a comment (deleted or not) and check the caller wrote it.
async fn ensure_own_comment(
    store: &mut CommentStore<'_>,
    drop_id: DbId,
    id: DbId,
    user: ActingUser,
) -> AppResult<Comment> {
    let comment = store
        .get_including_deleted(id, drop_id)
        .await
        .map_err(HierarchyError::from)?
        .ok_or(HierarchyError::NotFound {
            kind: "Comment",
            id,
        })?;
    ensure_author(comment.author_id, user.user_id)?;
    Ok(comment)
}

/// Attach the number of live direct replies to each comment.
async fn summarize(
    store: &mut CommentStore<'_>,
    comments: Vec<Comment>,
    drop_id: DbId,
) -> AppResult<Vec<CommentSummary>> {
    let ids: Vec<DbId> = comments.iter().map(|comment| comment.id).collect();
    let counts = store.live_reply_counts(&ids, drop_id).await?;

    Ok(comments
        .into_iter()
        .map(|comment| CommentSummary {
            replies_count: counts.get(&comment.id).copied().unwrap_or(0),
            comment,
        })
        .collect())
}

async fn summarize_one(
    store: &mut CommentStore<'_>,
    comment: Comment,
    drop_id: DbId,
) -> AppResult<CommentSummary> {
    let counts = store.live_reply_counts(&[comment.id], drop_id).await?;
    Ok(CommentSummary {
        replies_count: counts.get(&comment.id).copied().unwrap_or(0),
        comment,
    })
}

// ---------------------------------------------------------------------------
// GET /drops/{drop_id}/comments
// ---------------------------------------------------------------------------

/// Top-level comments on a drop, oldest first.
pub async fn list_comments(
    State(state): State<AppState>,
    _user: ActingUser,
    Path(drop_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    ensure_drop_live(&mut conn, drop_id).await?;

    let mut store = CommentStore::new(&mut conn);
    let top_level = TreeProjection::children::<Comment, _>(&mut store, None, drop_id).await?;
    let comments = summarize(&mut store, top_level, drop_id).await?;

    tracing::debug!(count = comments.len(), drop_id, "Listed comments");

    Ok(Json(DataResponse { data: comments }))
}

// ---------------------------------------------------------------------------
// POST /drops/{drop_id}/comments
// ---------------------------------------------------------------------------

/// Post a comment, or a reply when `parent_id` is set.
pub async fn create_comment(
    State(state): State<AppState>,
    user: ActingUser,
    Path(drop_id): Path<DbId>,
    Json(body): Json<CreateComment>,
) -> AppResult<impl IntoResponse> {
    let payload = NewComment::new(user.user_id, &body)?;

    let mut tx = state.pool.begin().await?;
    ensure_drop_live(&mut tx, drop_id).await?;
    let comment: Comment = TreeMutations::create(
        &mut CommentStore::new(&mut tx),
        drop_id,
        body.parent_id,
        &payload,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        comment_id = comment.id,
        drop_id,
        user_id = user.user_id,
        parent_id = ?comment.parent_id,
        "Comment created"
    );

    let data = CommentSummary {
        comment,
        replies_count: 0,
    };
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

// ---------------------------------------------------------------------------
// GET /drops/{drop_id}/comments/{id}
// ---------------------------------------------------------------------------

/// A single live comment with its reply count.
pub async fn get_comment(
    State(state): State<AppState>,
    _user: ActingUser,
    Path((drop_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    ensure_drop_live(&mut conn, drop_id).await?;

    let mut store = CommentStore::new(&mut conn);
    let comment: Comment = TreeProjection::node(&mut store, id, drop_id).await?;
    let data = summarize_one(&mut store, comment, drop_id).await?;

    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// GET /drops/{drop_id}/comments/tree
// ---------------------------------------------------------------------------

/// The whole thread of a drop as nested replies.
pub async fn get_comment_tree(
    State(state): State<AppState>,
    _user: ActingUser,
    Path(drop_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    ensure_drop_live(&mut conn, drop_id).await?;

    let tree =
        TreeProjection::subtree::<Comment, _>(&mut CommentStore::new(&mut conn), None, drop_id)
            .await?;

    Ok(Json(DataResponse { data: tree }))
}

// ---------------------------------------------------------------------------
// GET /drops/{drop_id}/comments/{id}/replies
// ---------------------------------------------------------------------------

/// Nested replies below one comment.
pub async fn get_replies(
    State(state): State<AppState>,
    _user: ActingUser,
    Path((drop_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    ensure_drop_live(&mut conn, drop_id).await?;

    let replies =
        TreeProjection::subtree::<Comment, _>(&mut CommentStore::new(&mut conn), Some(id), drop_id)
            .await?;

    Ok(Json(DataResponse { data: replies }))
}

// ---------------------------------------------------------------------------
// PUT /drops/{drop_id}/comments/{id}
// ---------------------------------------------------------------------------

/// Edit a comment's content. Author only.
pub async fn update_comment(
    State(state): State<AppState>,
    user: ActingUser,
    Path((drop_id, id)): Path<(DbId, DbId)>,
    Json(body): Json<UpdateComment>,
) -> AppResult<impl IntoResponse> {
    let changes = body.validated()?;

    let mut tx = state.pool.begin().await?;
    ensure_drop_live(&mut tx, drop_id).await?;
    let mut store = CommentStore::new(&mut tx);
    ensure_own_comment(&mut store, drop_id, id, user).await?;
    let comment: Comment = TreeMutations::update(&mut store, id, drop_id, &changes).await?;
    let data = summarize_one(&mut store, comment, drop_id).await?;
    tx.commit().await?;

    tracing::info!(comment_id = id, drop_id, user_id = user.user_id, "Comment updated");

    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// DELETE /drops/{drop_id}/comments/{id}
// ---------------------------------------------------------------------------

/// Soft-delete a comment and every reply below it. Author only.
pub async fn delete_comment(
    State(state): State<AppState>,
    user: ActingUser,
    Path((drop_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let mut tx = state.pool.begin().await?;
    ensure_drop_live(&mut tx, drop_id).await?;
    let mut store = CommentStore::new(&mut tx);
    ensure_own_comment(&mut store, drop_id, id, user).await?;
    let deleted = TreeMutations::delete::<Comment, _>(&mut store, id, drop_id).await?;
    tx.commit().await?;

    tracing::info!(comment_id = id, drop_id, user_id = user.user_id, deleted, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}
