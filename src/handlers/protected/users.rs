// handlers/protected/users.rs - /api/users (login account administration)

use std::collections::HashMap;

use axum::extract::{Extension, Path, Query, State};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Account, AccountStatus, Role};
use crate::error::{ApiError, Resource};
use crate::filter::{resources::USER_FILTERS, Pagination};
use crate::handlers::utils::{list_params, parse_enum, require_fields, text};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::services::accounts::{create_account, profile_changes, save_account, NewAccount, ProfileUpdate};
use crate::services::activity;

#[derive(Debug, Default, Deserialize)]
pub struct CreateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
    pub badge_number: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub badge_number: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

/// GET /api/users (admin) - role, status, department, search, page, limit
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Account>> {
    let (filter, page) = list_params(&state, &USER_FILTERS, &params);
    let result = state.store.list_accounts(&filter, page).await?;
    Ok(ApiResponse::paginated(result.items, Pagination::new(page, result.total)))
}

async fn find(state: &AppState, raw_id: &str) -> Result<Account, ApiError> {
    let not_found = || ApiError::not_found(Resource::User, raw_id);
    let id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
    state.store.find_account(id).await?.ok_or_else(not_found)
}

/// GET /api/users/:id - Admins see anyone, others only themselves
pub async fn show(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Account> {
    let account = find(&state, &id).await?;
    auth_user.require_self_or_admin(account.id)?;
    Ok(ApiResponse::success(account))
}

/// POST /api/users (admin)
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateUser>,
) -> ApiResult<Account> {
    require_fields(&[
        ("username", payload.username.as_deref()),
        ("email", payload.email.as_deref()),
        ("password", payload.password.as_deref()),
        ("name", payload.name.as_deref()),
    ])?;
    let role = parse_enum::<Role>("role", payload.role.as_deref())?.unwrap_or(Role::Officer);

    let account = create_account(
        state.store.as_ref(),
        NewAccount {
            username: text(payload.username),
            email: text(payload.email),
            password: payload.password.unwrap_or_default(),
            name: text(payload.name),
            department: payload.department,
            badge_number: payload.badge_number,
            role,
        },
    )
    .await?;
    activity::record(state.store.as_ref(), &auth_user, "create", "user", &account.id.to_string()).await?;

    Ok(ApiResponse::created(account))
}

/// PATCH /api/users/:id - Profile fields for self or admin; role and status for admin only
pub async fn update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateUser>,
) -> ApiResult<Account> {
    let account = find(&state, &id).await?;
    auth_user.require_self_or_admin(account.id)?;

    let role = parse_enum::<Role>("role", payload.role.as_deref())?;
    let status = parse_enum::<AccountStatus>("status", payload.status.as_deref())?;
    if (role.is_some() || status.is_some()) && !auth_user.is_admin() {
        tracing::warn!("'{}' tried to change role or status of {}", auth_user.username, account.id);
        return Err(ApiError::forbidden("Only administrators can change role or status"));
    }

    let profile = ProfileUpdate {
        name: payload.name,
        email: payload.email,
        department: payload.department,
        badge_number: payload.badge_number,
    };
    let mut changes = profile_changes(state.store.as_ref(), account.id, profile).await?;
    changes.role = role;
    changes.status = status;

    let account = save_account(state.store.as_ref(), account.id, &changes).await?;
    activity::record(state.store.as_ref(), &auth_user, "update", "user", &account.id.to_string()).await?;

    Ok(ApiResponse::success(account))
}

/// DELETE /api/users/:id (admin) - An account cannot delete itself
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let account = find(&state, &id).await?;
    if account.id == auth_user.id {
        return Err(ApiError::SelfDelete);
    }

    if !state.store.delete_account(account.id).await? {
        return Err(ApiError::not_found(Resource::User, &id));
    }
    activity::record(state.store.as_ref(), &auth_user, "delete", "user", &account.id.to_string()).await?;

    Ok(ApiResponse::success(json!({ "id": account.id, "deleted": true })))
}
