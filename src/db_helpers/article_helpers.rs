use sqlx::Sqlite;

use crate::{
    errors::RequestError,
    models::{Article, Row},
    store::{Store, ARTICLES},
};

use super::{ensure_exists, list_rows_in_db, ListParams};

const NOT_FOUND: &str = "Article not found";

pub async fn add_article_in_db(store: &Store, article: &Article) -> Result<i64, RequestError> {
    let mut tx = store.pool.begin().await?;
    let result = sqlx::query(
        r#"
        INSERT INTO articles (title, content, created_at, updated_at, title_image)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&article.title)
    .bind(&article.content)
    .bind(article.created_at)
    .bind(article.updated_at)
    .bind(&article.title_image)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(result.last_insert_rowid())
}

pub async fn get_article_by_id_in_db(store: &Store, id: i64) -> Result<Article, RequestError> {
    let mut tx = store.pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, Article>(
        r#"
        SELECT id, title, content, created_at, updated_at, title_image
        FROM articles WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut tx)
    .await?;
    tx.commit().await?;
    result.ok_or(RequestError::NotFound(NOT_FOUND))
}

pub async fn list_articles_in_db(
    store: &Store,
    params: &ListParams,
) -> Result<Vec<Row>, RequestError> {
    list_rows_in_db(store, ARTICLES.table, params).await
}

/// Newest first, for the public projection endpoint.
pub async fn list_latest_articles_in_db(
    store: &Store,
    limit: i64,
    offset: i64,
) -> Result<Vec<Article>, RequestError> {
    let result = sqlx::query_as::<Sqlite, Article>(
        r#"
        SELECT id, title, content, created_at, updated_at, title_image
        FROM articles
        ORDER BY created_at DESC, id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&store.pool)
    .await?;
    Ok(result)
}

/// Overwrites every column of an existing article.
pub async fn update_article_by_id_in_db(
    store: &Store,
    article: &Article,
) -> Result<(), RequestError> {
    let mut tx = store.pool.begin().await?;
    ensure_exists(&mut tx, ARTICLES.table, article.id, NOT_FOUND).await?;
    let result = sqlx::query(
        r#"
        UPDATE articles
        SET title = $1, content = $2, created_at = $3, updated_at = $4, title_image = $5
        WHERE id = $6
        "#,
    )
    .bind(&article.title)
    .bind(&article.content)
    .bind(article.created_at)
    .bind(article.updated_at)
    .bind(&article.title_image)
    .bind(article.id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    tracing::debug!(
        "Number of articles updated in database: {}",
        result.rows_affected()
    );
    Ok(())
}

pub async fn delete_article_in_db(store: &Store, id: i64) -> Result<(), RequestError> {
    let mut tx = store.pool.begin().await?;
    ensure_exists(&mut tx, ARTICLES.table, id, NOT_FOUND).await?;
    let result = sqlx::query("DELETE FROM articles WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    tracing::debug!(
        "Number of articles deleted in database: {}",
        result.rows_affected()
    );
    Ok(())
}
