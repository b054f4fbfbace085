#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, Response, StatusCode};
use serde_json::{json, Value};

use precinct_api::config::AppConfig;
use precinct_api::database::models::{Account, Role};
use precinct_api::database::{MemoryStore, Store};
use precinct_api::services::accounts::{create_account, NewAccount};
use precinct_api::{app, AppState};

pub const ADMIN_PASSWORD: &str = "chief2024";
pub const OFFICER_PASSWORD: &str = "patrol2024";

/// In-process server on a free port backed by its own memory store
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
    pub admin: Account,
    pub officer: Account,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(AppConfig::development()).await
    }

    pub async fn spawn_with(mut config: AppConfig) -> Result<Self> {
        config.api.enable_request_logging = false;

        let store = Arc::new(MemoryStore::new());
        let admin = seed_account(store.as_ref(), "chief", "chief@precinct.gov", ADMIN_PASSWORD, Role::Admin).await?;
        let officer =
            seed_account(store.as_ref(), "ada", "ada@precinct.gov", OFFICER_PASSWORD, Role::Officer).await?;

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let state = AppState::new(store.clone() as Arc<dyn Store>, config.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            store,
            config,
            admin,
            officer,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let res = self
            .request(Method::POST, "/api/auth/login", None, Some(json!({ "username": username, "password": password })))
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login as {} failed: {}", username, res.status());
        let body: Value = res.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response carried no token")
    }

    pub async fn admin_token(&self) -> Result<String> {
        self.login("chief", ADMIN_PASSWORD).await
    }

    pub async fn officer_token(&self) -> Result<String> {
        self.login("ada", OFFICER_PASSWORD).await
    }

    pub async fn request(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Result<Response> {
        let mut req = self.client.request(method, self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        Ok(req.send().await?)
    }

    /// Send and decode, returning the status alongside the JSON body
    pub async fn call(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let res = self.request(method, path, token, body).await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        Ok((status, body))
    }
}

pub async fn seed_account(store: &dyn Store, username: &str, email: &str, password: &str, role: Role) -> Result<Account> {
    let account = create_account(
        store,
        NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            name: username.to_string(),
            department: Some("Central".to_string()),
            badge_number: None,
            role,
        },
    )
    .await?;
    Ok(account)
}
