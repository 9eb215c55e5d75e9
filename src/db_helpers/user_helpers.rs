use chrono::Utc;
use sqlx::Sqlite;

use crate::{data_formats::RegisterRequest, errors::RequestError, models::User, store::Store};

const USER_COLUMNS: &str = "id, username, email, password";

/// Expects `user.password` to already be hashed.
pub async fn insert_user(store: &Store, user: &RegisterRequest) -> Result<User, RequestError> {
    let mut tx = store.pool.begin().await?;
    let query = format!(
        "INSERT INTO users (email, username, password, created_at) VALUES ($1, $2, $3, $4) RETURNING {}",
        USER_COLUMNS
    );
    let user = sqlx::query_as::<Sqlite, User>(&query)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password)
        .bind(Utc::now())
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(user)
}

pub async fn get_user_by_email(store: &Store, email: &str) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(email)
        .fetch_optional(&store.pool)
        .await?;
    Ok(result)
}

pub async fn get_user_by_id(store: &Store, id: i64) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(id)
        .fetch_optional(&store.pool)
        .await?;
    Ok(result)
}
