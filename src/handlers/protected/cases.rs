// handlers/protected/cases.rs - /api/cases

use std::collections::HashMap;

use axum::extract::{Extension, Path, Query, State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Case, CaseStatus, Priority};
use crate::database::sequence::{self, SequenceKind};
use crate::error::{ApiError, Resource};
use crate::filter::{resources::CASE_FILTERS, Pagination};
use crate::handlers::utils::{list_params, parse_enum, require_fields, text};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::services::{accounts::non_blank, activity};

#[derive(Debug, Default, Deserialize)]
pub struct CasePayload {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub case_type: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<String>,
}

/// GET /api/cases - status, type, priority, officer, search, page, limit
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Case>> {
    let (filter, page) = list_params(&state, &CASE_FILTERS, &params);
    let result = state.store.list_cases(&filter, page).await?;
    Ok(ApiResponse::paginated(result.items, Pagination::new(page, result.total)))
}

/// GET /api/cases/:id
pub async fn show(State(state): State<AppState>, Path(case_id): Path<String>) -> ApiResult<Case> {
    let case = state
        .store
        .find_case(&case_id)
        .await?
        .ok_or_else(|| ApiError::not_found(Resource::Case, &case_id))?;
    Ok(ApiResponse::success(case))
}

/// POST /api/cases - Open a case under the next `CA-####` code
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CasePayload>,
) -> ApiResult<Case> {
    require_fields(&[
        ("type", payload.case_type.as_deref()),
        ("location", payload.location.as_deref()),
    ])?;
    let status = parse_enum::<CaseStatus>("status", payload.status.as_deref())?.unwrap_or(CaseStatus::Open);
    let priority = parse_enum::<Priority>("priority", payload.priority.as_deref())?.unwrap_or(Priority::Medium);
    let assigned_to = match payload.assigned_to.as_deref() {
        Some(raw) => resolve_assignee(&state, raw).await?,
        None => None,
    };

    let case_id = sequence::allocate(state.store.as_ref(), SequenceKind::Case).await?;
    let now = Utc::now();
    let case = Case {
        case_id,
        title: non_blank(payload.title),
        case_type: text(payload.case_type),
        description: non_blank(payload.description),
        location: text(payload.location),
        status,
        priority,
        created_by: auth_user.id,
        assigned_to,
        created_at: now,
        updated_at: now,
    };

    state.store.insert_case(&case).await?;
    activity::record(state.store.as_ref(), &auth_user, "create", "case", &case.case_id).await?;

    Ok(ApiResponse::created(case))
}

/// PATCH /api/cases/:id - Partial update; `assigned_to: ""` clears the assignment
pub async fn update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(case_id): Path<String>,
    ApiJson(payload): ApiJson<CasePayload>,
) -> ApiResult<Case> {
    let mut case = state
        .store
        .find_case(&case_id)
        .await?
        .ok_or_else(|| ApiError::not_found(Resource::Case, &case_id))?;

    if let Some(status) = parse_enum::<CaseStatus>("status", payload.status.as_deref())? {
        case.status = status;
    }
    if let Some(priority) = parse_enum::<Priority>("priority", payload.priority.as_deref())? {
        case.priority = priority;
    }
    if let Some(raw) = payload.assigned_to.as_deref() {
        case.assigned_to = resolve_assignee(&state, raw).await?;
    }
    if payload.title.is_some() {
        case.title = non_blank(payload.title);
    }
    if payload.description.is_some() {
        case.description = non_blank(payload.description);
    }
    if let Some(case_type) = non_blank(payload.case_type) {
        case.case_type = case_type;
    }
    if let Some(location) = non_blank(payload.location) {
        case.location = location;
    }
    case.updated_at = Utc::now();

    state.store.update_case(&case).await?;
    activity::record(state.store.as_ref(), &auth_user, "update", "case", &case.case_id).await?;

    Ok(ApiResponse::success(case))
}

/// DELETE /api/cases/:id (admin)
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(case_id): Path<String>,
) -> ApiResult<Value> {
    if !state.store.delete_case(&case_id).await? {
        return Err(ApiError::not_found(Resource::Case, &case_id));
    }
    activity::record(state.store.as_ref(), &auth_user, "delete", "case", &case_id).await?;

    Ok(ApiResponse::success(json!({ "case_id": case_id, "deleted": true })))
}

/// Blank clears the assignment; otherwise the id must name an existing account
async fn resolve_assignee(state: &AppState, raw: &str) -> Result<Option<Uuid>, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let id = Uuid::parse_str(raw)
        .map_err(|_| ApiError::validation_error(format!("Invalid assigned_to: '{}'", raw)))?;
    if state.store.find_account(id).await?.is_none() {
        return Err(ApiError::validation_error(format!("Assigned account '{}' does not exist", raw)));
    }
    Ok(Some(id))
}
