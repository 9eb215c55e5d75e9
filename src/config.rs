use std::{env, net::SocketAddr};

use anyhow::{Context, Result};

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string, e.g. `sqlite://pet.db`
    pub database_url: String,
    /// HS256 secret used to sign bearer tokens
    pub jwt_secret: String,
    pub server_address: String,
    pub server_port: u16,
    pub db_max_connections: u32,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        Ok(Config {
            database_url,
            jwt_secret,
            server_address: env::var("SERVER_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3001),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        })
    }

    /// Private in-memory database on a single connection.
    pub fn in_memory(jwt_secret: &str) -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: jwt_secret.to_string(),
            server_address: "127.0.0.1".to_string(),
            server_port: 0,
            db_max_connections: 1,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:")
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server_address, self.server_port)
            .parse()
            .context("SERVER_ADDRESS/SERVER_PORT do not form a socket address")
    }
}
