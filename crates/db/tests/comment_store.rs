//! Integration tests for `CommentStore` and `DropRepo`.
//!
//! Run against the PostgreSQL database named by `DATABASE_URL`.

use assert_matches::assert_matches;
use sqlx::PgPool;

use dropdeck_core::hierarchy::{HierarchyError, TreeMutations, TreeProjection};
use dropdeck_core::types::DbId;
use dropdeck_db::models::comment::{Comment, NewComment, UpdateComment};
use dropdeck_db::repositories::{CommentStore, DropRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, name: &str) -> DbId {
    let row: (DbId,) =
        sqlx::query_as("INSERT INTO users (username, email) VALUES ($1, $2) RETURNING id")
            .bind(name)
            .bind(format!("{name}@example.com"))
            .fetch_one(pool)
            .await
            .unwrap();
    row.0
}

async fn new_drop(pool: &PgPool, user_id: DbId) -> DbId {
    let row: (DbId,) =
        sqlx::query_as("INSERT INTO drops (user_id, url) VALUES ($1, $2) RETURNING id")
            .bind(user_id)
            .bind("https://example.com/article")
            .fetch_one(pool)
            .await
            .unwrap();
    row.0
}

async fn post(
    pool: &PgPool,
    drop_id: DbId,
    author_id: DbId,
    parent: Option<DbId>,
    content: &str,
) -> Comment {
    let payload = NewComment {
        author_id,
        content: content.to_string(),
    };
    let mut conn = pool.acquire().await.unwrap();
    TreeMutations::create(&mut CommentStore::new(&mut conn), drop_id, parent, &payload)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn thread_is_ordered_oldest_first(pool: PgPool) {
    let user = new_user(&pool, "fa").await;
    let drop_id = new_drop(&pool, user).await;
    let top = post(&pool, drop_id, user, None, "top").await;
    post(&pool, drop_id, user, Some(top.id), "first reply").await;
    post(&pool, drop_id, user, Some(top.id), "second reply").await;

    let mut conn = pool.acquire().await.unwrap();
    let tree = TreeProjection::subtree::<Comment, _>(&mut CommentStore::new(&mut conn), None, drop_id)
        .await
        .unwrap();

    assert_eq!(tree.len(), 1);
    let replies: Vec<&str> = tree[0]
        .children
        .iter()
        .map(|r| r.node.content.as_str())
        .collect();
    assert_eq!(replies, vec!["first reply", "second reply"]);
    assert_eq!(tree[0].children[0].depth, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reply_must_stay_on_the_same_drop(pool: PgPool) {
    let user = new_user(&pool, "gu").await;
    let here = new_drop(&pool, user).await;
    let elsewhere = new_drop(&pool, user).await;
    let top = post(&pool, here, user, None, "top").await;

    let payload = NewComment {
        author_id: user,
        content: "misplaced".to_string(),
    };
    let mut conn = pool.acquire().await.unwrap();
    let result: Result<Comment, _> =
        TreeMutations::create(&mut CommentStore::new(&mut conn), elsewhere, Some(top.id), &payload)
            .await;
    assert_matches!(result, Err(HierarchyError::ParentNotFound { id, .. }) if id == top.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_a_comment_removes_its_replies(pool: PgPool) {
    let user = new_user(&pool, "ha").await;
    let drop_id = new_drop(&pool, user).await;
    let top = post(&pool, drop_id, user, None, "top").await;
    let reply = post(&pool, drop_id, user, Some(top.id), "reply").await;
    post(&pool, drop_id, user, Some(reply.id), "nested").await;
    post(&pool, drop_id, user, None, "other thread").await;

    let mut tx = pool.begin().await.unwrap();
    let deleted = TreeMutations::delete::<Comment, _>(&mut CommentStore::new(&mut tx), top.id, drop_id)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    assert_eq!(deleted, 3);

    let mut conn = pool.acquire().await.unwrap();
    let tree = TreeProjection::subtree::<Comment, _>(&mut CommentStore::new(&mut conn), None, drop_id)
        .await
        .unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].node.content, "other thread");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn soft_deleted_drop_is_not_live(pool: PgPool) {
    let user = new_user(&pool, "io").await;
    let drop_id = new_drop(&pool, user).await;

    let mut conn = pool.acquire().await.unwrap();
    assert!(DropRepo::is_live(&mut conn, drop_id).await.unwrap());
    assert!(!DropRepo::is_live(&mut conn, drop_id + 1000).await.unwrap());

    sqlx::query("UPDATE drops SET deleted_at = NOW() WHERE id = $1")
        .bind(drop_id)
        .execute(&mut *conn)
        .await
        .unwrap();
    assert!(!DropRepo::is_live(&mut conn, drop_id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rows_carry_author_name_and_live_reply_counts(pool: PgPool) {
    let author = new_user(&pool, "jo").await;
    let drop_id = new_drop(&pool, author).await;
    let top = post(&pool, drop_id, author, None, "top").await;
    let reply = post(&pool, drop_id, author, Some(top.id), "reply").await;
    let gone = post(&pool, drop_id, author, Some(top.id), "gone").await;
    let lonely = post(&pool, drop_id, author, None, "lonely").await;
    assert_eq!(top.user_name, "jo");

    let mut conn = pool.acquire().await.unwrap();
    let mut store = CommentStore::new(&mut conn);
    TreeMutations::delete::<Comment, _>(&mut store, gone.id, drop_id)
        .await
        .unwrap();

    let counts = store
        .live_reply_counts(&[top.id, lonely.id], drop_id)
        .await
        .unwrap();
    assert_eq!(counts.get(&top.id), Some(&1), "deleted replies are not counted");
    assert!(!counts.contains_key(&lonely.id));

    let edit = UpdateComment {
        content: "edited".to_string(),
    };
    let edited = TreeMutations::update(&mut store, reply.id, drop_id, &edit)
        .await
        .unwrap();
    assert_eq!(edited.content, "edited");
    assert_eq!(edited.user_name, "jo");
}
