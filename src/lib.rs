mod authentication;
mod config;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
mod models;
mod store;

use anyhow::Context;
pub use anyhow::Result;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
pub use config::Config;
pub use data_formats::*;
use handlers::*;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};
pub use store::{SchemaRegistry, Store};

pub type JsonResponse<T> = (StatusCode, Json<T>);

pub async fn run_app(app: Router, address: SocketAddr, store: Store, config: Config) -> Result<()> {
    let app = app
        .layer(Extension(Arc::new(store)))
        .layer(Extension(Arc::new(config)));
    tracing::info!("Server started on {}", address);
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(config: &Config) -> Result<SqlitePool> {
    let pool = if config.is_in_memory() {
        // Every connection to `:memory:` is its own database, so keep exactly one alive.
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(&config.database_url)
            .await?
    } else {
        let db_url = &config.database_url;
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            tracing::info!("Creating database {}", db_url);
            Sqlite::create_database(db_url)
                .await
                .with_context(|| format!("Failed to create database {}", db_url))?;
        } else {
            tracing::info!("Database already exists");
        }
        SqlitePoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(db_url)
            .await?
    };
    tracing::info!("Running Migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations completed");
    Ok(pool)
}

/// Opens the database and registers every table mapping.
pub async fn init_store(config: &Config) -> Result<Store> {
    let pool = init_db(config).await?;
    Ok(Store::new(pool, SchemaRegistry::all()))
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        .route("/users/login", post(login_user))
        .route("/users", post(register_user))
        .route("/photos", post(create_photo))
        .route("/photos/:id", get(get_photo))
        .route(
            "/photo_comments",
            post(create_photo_comment).get(list_photo_comments),
        )
        .route(
            "/photo_comments/:id",
            get(get_photo_comment)
                .put(update_photo_comment)
                .delete(delete_photo_comment),
        )
        .route("/articles", post(create_article).get(list_articles))
        .route(
            "/articles/:id",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/api/articles", get(list_articles_api))
        .route("/api/articles/:id", get(get_article_api))
        .fallback(not_found)
}
