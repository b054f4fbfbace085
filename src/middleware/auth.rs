use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::decode_jwt;
use crate::config::SecurityConfig;
use crate::database::models::{Account, Role};
use crate::database::Store;
use crate::error::ApiError;

/// Account resolved from the bearer token, attached to each protected request
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub role: Role,
}

impl From<&Account> for AuthUser {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
            department: account.department.clone(),
            role: account.role,
        }
    }
}

/// JWT authentication middleware that validates tokens and resolves the account
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(request.headers())?;
    let auth_user = verify_token(state.store.as_ref(), &state.config.security, token).await?;

    tracing::debug!("Authenticated {} ({}) for {}", auth_user.username, auth_user.role, request.uri().path());

    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_str = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::NoToken)?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(ApiError::NoToken),
    }
}

/// Verify signature and expiry, then require the subject to be an existing, active account.
/// Runs on every request; nothing is cached.
pub async fn verify_token(store: &dyn Store, security: &SecurityConfig, token: &str) -> Result<AuthUser, ApiError> {
    let claims = decode_jwt(token, security)?;
    let account_id = claims.account_id()?;

    let account = store.find_account(account_id).await?.ok_or_else(|| {
        tracing::warn!("Token subject {} no longer exists", account_id);
        ApiError::UserNotFound
    })?;

    if !account.is_active() {
        tracing::warn!("Rejected token for inactive account '{}'", account.username);
        return Err(ApiError::InactiveUser);
    }

    Ok(AuthUser::from(&account))
}
