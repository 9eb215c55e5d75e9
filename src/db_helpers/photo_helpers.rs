use sqlx::Sqlite;

use crate::{errors::RequestError, models::Photo, store::Store};

pub async fn add_photo_in_db(store: &Store, photo: &Photo) -> Result<i64, RequestError> {
    let mut tx = store.pool.begin().await?;
    let result = sqlx::query(
        r#"
        INSERT INTO photos (title, url, user_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&photo.title)
    .bind(&photo.url)
    .bind(photo.user_id)
    .bind(photo.created_at)
    .bind(photo.updated_at)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(result.last_insert_rowid())
}

/// Resolves a photo reference; comments cannot be attached to a missing photo.
pub async fn get_photo_by_id_in_db(store: &Store, id: i64) -> Result<Photo, RequestError> {
    let mut tx = store.pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, Photo>(
        r#"
        SELECT id, title, url, user_id, created_at, updated_at FROM photos WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut tx)
    .await?;
    tx.commit().await?;
    result.ok_or(RequestError::NotFound("Photo not found"))
}
