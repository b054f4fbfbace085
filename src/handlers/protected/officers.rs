// handlers/protected/officers.rs - /api/officers (personnel profiles keyed by badge number)

use std::collections::HashMap;

use axum::extract::{Extension, Path, Query, State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::password::is_valid_email;
use crate::database::models::{OfficerProfile, OfficerStatus};
use crate::database::DatabaseError;
use crate::error::{ApiError, Resource};
use crate::filter::{resources::OFFICER_FILTERS, Pagination};
use crate::handlers::utils::{list_params, parse_enum, require_fields, text};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::services::{accounts::non_blank, activity};

#[derive(Debug, Default, Deserialize)]
pub struct OfficerPayload {
    pub badge_number: Option<String>,
    pub name: Option<String>,
    pub rank: Option<String>,
    pub unit: Option<String>,
    pub status: Option<String>,
    pub active_cases: Option<i32>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// GET /api/officers - status, rank, unit, search, page, limit
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<OfficerProfile>> {
    let (filter, page) = list_params(&state, &OFFICER_FILTERS, &params);
    let result = state.store.list_officers(&filter, page).await?;
    Ok(ApiResponse::paginated(result.items, Pagination::new(page, result.total)))
}

/// GET /api/officers/:badge
pub async fn show(State(state): State<AppState>, Path(badge): Path<String>) -> ApiResult<OfficerProfile> {
    let officer = state
        .store
        .find_officer(&badge)
        .await?
        .ok_or_else(|| ApiError::not_found(Resource::Officer, &badge))?;
    Ok(ApiResponse::success(officer))
}

/// POST /api/officers
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<OfficerPayload>,
) -> ApiResult<OfficerProfile> {
    require_fields(&[
        ("badge_number", payload.badge_number.as_deref()),
        ("name", payload.name.as_deref()),
        ("rank", payload.rank.as_deref()),
        ("unit", payload.unit.as_deref()),
    ])?;
    let status = parse_enum::<OfficerStatus>("status", payload.status.as_deref())?.unwrap_or(OfficerStatus::Active);
    let email = validated_email(payload.email)?;
    let active_cases = validated_active_cases(payload.active_cases)?.unwrap_or(0);

    let now = Utc::now();
    let officer = OfficerProfile {
        badge_number: text(payload.badge_number),
        name: text(payload.name),
        rank: text(payload.rank),
        unit: text(payload.unit),
        status,
        active_cases,
        email,
        phone: non_blank(payload.phone),
        created_at: now,
        updated_at: now,
    };

    state.store.insert_officer(&officer).await.map_err(|e| match e {
        DatabaseError::Conflict(_) => {
            ApiError::DuplicateEntry(format!("Badge number '{}' is already registered", officer.badge_number))
        }
        other => other.into(),
    })?;
    activity::record(state.store.as_ref(), &auth_user, "create", "officer", &officer.badge_number).await?;

    Ok(ApiResponse::created(officer))
}

/// PATCH /api/officers/:badge - The badge number itself is immutable
pub async fn update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(badge): Path<String>,
    ApiJson(payload): ApiJson<OfficerPayload>,
) -> ApiResult<OfficerProfile> {
    let mut officer = state
        .store
        .find_officer(&badge)
        .await?
        .ok_or_else(|| ApiError::not_found(Resource::Officer, &badge))?;

    if let Some(status) = parse_enum::<OfficerStatus>("status", payload.status.as_deref())? {
        officer.status = status;
    }
    if let Some(active_cases) = validated_active_cases(payload.active_cases)? {
        officer.active_cases = active_cases;
    }
    if payload.email.is_some() {
        officer.email = validated_email(payload.email)?;
    }
    if payload.phone.is_some() {
        officer.phone = non_blank(payload.phone);
    }
    if let Some(name) = non_blank(payload.name) {
        officer.name = name;
    }
    if let Some(rank) = non_blank(payload.rank) {
        officer.rank = rank;
    }
    if let Some(unit) = non_blank(payload.unit) {
        officer.unit = unit;
    }
    officer.updated_at = Utc::now();

    state.store.update_officer(&officer).await?;
    activity::record(state.store.as_ref(), &auth_user, "update", "officer", &officer.badge_number).await?;

    Ok(ApiResponse::success(officer))
}

/// DELETE /api/officers/:badge (admin)
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(badge): Path<String>,
) -> ApiResult<Value> {
    if !state.store.delete_officer(&badge).await? {
        return Err(ApiError::not_found(Resource::Officer, &badge));
    }
    activity::record(state.store.as_ref(), &auth_user, "delete", "officer", &badge).await?;

    Ok(ApiResponse::success(json!({ "badge_number": badge, "deleted": true })))
}

fn validated_email(email: Option<String>) -> Result<Option<String>, ApiError> {
    match non_blank(email) {
        Some(email) if !is_valid_email(&email) => Err(ApiError::InvalidEmail),
        other => Ok(other),
    }
}

fn validated_active_cases(count: Option<i32>) -> Result<Option<i32>, ApiError> {
    match count {
        Some(n) if n < 0 => Err(ApiError::validation_error("active_cases cannot be negative")),
        other => Ok(other),
    }
}
