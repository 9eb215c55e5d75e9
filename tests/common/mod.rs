#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use pet::{get_random_free_port, init_store, make_router, run_app, Config};
use serde_json::{json, Value};

const JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
}

/// Serves the full router over a private in-memory database on a free port.
pub async fn spawn_app() -> Result<TestApp> {
    let config = Config::in_memory(JWT_SECRET);
    let store = init_store(&config).await?;
    let (_, address) = get_random_free_port();
    tokio::spawn(run_app(make_router(), address, store, config));

    let app = TestApp {
        base_url: format!("http://{}", address),
        client: reqwest::Client::new(),
    };
    app.wait_ready(Duration::from_secs(5)).await?;
    Ok(app)
}

impl TestApp {
    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(res) = self.client.get(self.url("/check_health")).send().await {
                if res.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {}", self.base_url)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json(&self, path: &str) -> Result<Value> {
        let res = self.client.get(self.url(path)).send().await?;
        Ok(res.json().await?)
    }

    /// Registers a user and returns its bearer token.
    pub async fn register(&self, username: &str) -> Result<String> {
        let body = json!({
            "user": {
                "email": format!("{}@example.com", username),
                "password": "password123",
                "username": username,
            }
        });
        let res: Value = self
            .client
            .post(self.url("/users"))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        res["user"]["token"]
            .as_str()
            .map(str::to_string)
            .context("register response carries no token")
    }

    /// Signs a token for `id` without registering anyone.
    pub fn token_for(&self, id: i64) -> Result<String> {
        let exp = chrono::Utc::now() + chrono::Duration::days(1);
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &json!({ "id": id, "exp": exp.timestamp() }),
            &jsonwebtoken::EncodingKey::from_secret(JWT_SECRET.as_ref()),
        )?;
        Ok(token)
    }

    pub async fn post_form(
        &self,
        path: &str,
        token: Option<&str>,
        form: &[(&str, &str)],
    ) -> Result<Value> {
        let mut req = self.client.post(self.url(path)).form(form);
        if let Some(token) = token {
            req = req.header("Authorization", format!("Token {}", token));
        }
        Ok(req.send().await?.json().await?)
    }

    pub async fn create_photo(&self, token: &str, title: &str) -> Result<i64> {
        let res = self
            .post_form("/photos", Some(token), &[("title", title), ("url", "/p.png")])
            .await?;
        res["data"]["id"].as_i64().context("photo was not created")
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> Result<Value> {
        let res = self.client.put(self.url(path)).json(body).send().await?;
        Ok(res.json().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        let res = self.client.delete(self.url(path)).send().await?;
        Ok(res.json().await?)
    }
}
