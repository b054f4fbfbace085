// handlers/public/auth.rs - POST /api/auth/login, POST /api/auth/register

use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::password::{verify_dummy, verify_password};
use crate::auth::{generate_jwt, Claims};
use crate::database::models::{Account, ActivityEntry, Role};
use crate::error::ApiError;
use crate::handlers::utils::{require_fields, text};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::accounts::{create_account, NewAccount};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub username: String,
    pub name: String,
    pub department: Option<String>,
    pub id: Uuid,
}

/// POST /api/auth/login - Exchange credentials for a bearer token
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    require_fields(&[
        ("username", payload.username.as_deref()),
        ("password", payload.password.as_deref()),
    ])?;
    let username = text(payload.username);
    let password = payload.password.unwrap_or_default();

    let Some(account) = state.store.find_account_by_username(&username).await? else {
        verify_dummy(&password);
        tracing::warn!("Login failed for unknown user '{}'", username);
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&password, &account.password_hash) {
        tracing::warn!("Login failed for '{}': wrong password", username);
        return Err(ApiError::InvalidCredentials);
    }

    if !account.is_active() {
        tracing::warn!("Login refused for inactive account '{}'", username);
        return Err(ApiError::InactiveUser);
    }

    let claims = Claims::new(&account, state.config.security.jwt_expiry_hours);
    let token = generate_jwt(&claims, &state.config.security)?;

    state.store.touch_last_login(account.id, Utc::now()).await?;
    state
        .store
        .append_activity(&ActivityEntry::new("login", "user", account.id.to_string(), Some(account.id), account.username.clone()))
        .await?;

    tracing::info!("User '{}' logged in", account.username);

    Ok(ApiResponse::success(LoginResponse {
        token,
        role: account.role,
        username: account.username,
        name: account.name,
        department: account.department,
        id: account.id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
    pub badge_number: Option<String>,
}

/// POST /api/auth/register - Self-service officer account
pub async fn register_post(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<Account> {
    if !state.config.api.allow_registration {
        return Err(ApiError::forbidden("Registration is disabled"));
    }

    require_fields(&[
        ("username", payload.username.as_deref()),
        ("email", payload.email.as_deref()),
        ("password", payload.password.as_deref()),
        ("name", payload.name.as_deref()),
    ])?;

    let account = create_account(
        state.store.as_ref(),
        NewAccount {
            username: text(payload.username),
            email: text(payload.email),
            password: payload.password.unwrap_or_default(),
            name: text(payload.name),
            department: payload.department,
            badge_number: payload.badge_number,
            role: Role::Officer,
        },
    )
    .await?;

    state
        .store
        .append_activity(&ActivityEntry::new("register", "user", account.id.to_string(), Some(account.id), account.username.clone()))
        .await?;

    Ok(ApiResponse::created(account))
}
