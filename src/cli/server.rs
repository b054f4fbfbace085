use anyhow::Context;

use crate::app::{app, AppState};
use crate::config::{AppConfig, Environment};
use crate::database::DatabaseManager;
use crate::services::accounts::bootstrap_admin;

pub async fn serve(config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    if config.security.jwt_secret.is_empty() {
        if config.environment == Environment::Production {
            anyhow::bail!("SECURITY_JWT_SECRET must be set in production");
        }
        tracing::warn!("No JWT secret configured; logins will fail until SECURITY_JWT_SECRET is set");
    }

    let store = DatabaseManager::open_store(&config.database).await?;
    bootstrap_admin(store.as_ref(), &config.bootstrap).await?;

    let bind_addr = format!("0.0.0.0:{}", port.unwrap_or(config.api.port));
    tracing::info!("Starting Precinct Records API in {:?} mode", config.environment);

    let state = AppState::new(store, config);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
