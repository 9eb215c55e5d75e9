use sqlx::Sqlite;

use crate::{
    errors::RequestError,
    models::{PhotoComment, Row},
    store::{Store, PHOTO_COMMENTS},
};

use super::{ensure_exists, list_rows_in_db, ListParams};

const NOT_FOUND: &str = "Photo comment not found";

/// Inserts the comment and returns its new id.
pub async fn add_photo_comment_in_db(
    store: &Store,
    comment: &PhotoComment,
) -> Result<i64, RequestError> {
    let mut tx = store.pool.begin().await?;
    let result = sqlx::query(
        r#"
        INSERT INTO photo_comments (content, created_at, updated_at, photo_id, user_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&comment.content)
    .bind(comment.created_at)
    .bind(comment.updated_at)
    .bind(comment.photo_id)
    .bind(comment.user_id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(result.last_insert_rowid())
}

pub async fn get_photo_comment_by_id_in_db(
    store: &Store,
    id: i64,
) -> Result<PhotoComment, RequestError> {
    let mut tx = store.pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, PhotoComment>(
        r#"
        SELECT id, content, created_at, updated_at, photo_id, user_id
        FROM photo_comments WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut tx)
    .await?;
    tx.commit().await?;
    result.ok_or(RequestError::NotFound(NOT_FOUND))
}

pub async fn list_photo_comments_in_db(
    store: &Store,
    params: &ListParams,
) -> Result<Vec<Row>, RequestError> {
    list_rows_in_db(store, PHOTO_COMMENTS.table, params).await
}

/// Overwrites every column of an existing comment.
pub async fn update_photo_comment_by_id_in_db(
    store: &Store,
    comment: &PhotoComment,
) -> Result<(), RequestError> {
    let mut tx = store.pool.begin().await?;
    ensure_exists(&mut tx, PHOTO_COMMENTS.table, comment.id, NOT_FOUND).await?;
    let result = sqlx::query(
        r#"
        UPDATE photo_comments
        SET content = $1, created_at = $2, updated_at = $3, photo_id = $4, user_id = $5
        WHERE id = $6
        "#,
    )
    .bind(&comment.content)
    .bind(comment.created_at)
    .bind(comment.updated_at)
    .bind(comment.photo_id)
    .bind(comment.user_id)
    .bind(comment.id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    tracing::debug!(
        "Number of photo comments updated in database: {}",
        result.rows_affected()
    );
    Ok(())
}

pub async fn delete_photo_comment_in_db(store: &Store, id: i64) -> Result<(), RequestError> {
    let mut tx = store.pool.begin().await?;
    ensure_exists(&mut tx, PHOTO_COMMENTS.table, id, NOT_FOUND).await?;
    let result = sqlx::query("DELETE FROM photo_comments WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    tracing::debug!(
        "Number of photo comments deleted in database: {}",
        result.rows_affected()
    );
    Ok(())
}
