// handlers/protected/auth.rs - Session endpoints for the authenticated account

use axum::extract::{Extension, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::password::{check_strength, hash_password, verify_password};
use crate::database::models::{Account, AccountChanges};
use crate::error::ApiError;
use crate::handlers::utils::require_fields;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::services::accounts::{profile_changes, save_account, ProfileUpdate};
use crate::services::activity;

async fn current_account(state: &AppState, auth_user: &AuthUser) -> Result<Account, ApiError> {
    state.store.find_account(auth_user.id).await?.ok_or(ApiError::UserNotFound)
}

/// GET /api/auth/me
pub async fn me_get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Account> {
    Ok(ApiResponse::success(current_account(&state, &auth_user).await?))
}

/// PATCH /api/auth/profile - name, email, department, badge_number
pub async fn profile_patch(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<ProfileUpdate>,
) -> ApiResult<Account> {
    let changes = profile_changes(state.store.as_ref(), auth_user.id, payload).await?;
    let account = save_account(state.store.as_ref(), auth_user.id, &changes).await?;
    activity::record(state.store.as_ref(), &auth_user, "update", "user", &account.id.to_string()).await?;

    Ok(ApiResponse::success(account))
}

#[derive(Debug, Deserialize)]
pub struct PasswordChange {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// PUT /api/auth/password
pub async fn password_put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<PasswordChange>,
) -> ApiResult<Value> {
    require_fields(&[
        ("current_password", payload.current_password.as_deref()),
        ("new_password", payload.new_password.as_deref()),
    ])?;
    let current = payload.current_password.unwrap_or_default();
    let new_password = payload.new_password.unwrap_or_default();

    let account = current_account(&state, &auth_user).await?;
    if !verify_password(&current, &account.password_hash) {
        tracing::warn!("Password change for '{}' rejected: wrong current password", account.username);
        return Err(ApiError::InvalidCredentials);
    }
    check_strength(&new_password).map_err(ApiError::WeakPassword)?;

    let changes = AccountChanges {
        password_hash: Some(hash_password(&new_password)?),
        ..Default::default()
    };
    save_account(state.store.as_ref(), account.id, &changes).await?;
    activity::record(state.store.as_ref(), &auth_user, "password_change", "user", &account.id.to_string()).await?;

    Ok(ApiResponse::success(json!({ "message": "Password updated" })))
}
