// handlers/protected/dashboard.rs - /api/dashboard/*

use std::collections::HashMap;

use axum::extract::{Query, State};

use crate::app::AppState;
use crate::database::models::{ActivityEntry, Case};
use crate::filter::{Filter, Page};
use crate::handlers::utils::latest_limit;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::stats::{self, CaseDistribution, PersonnelStatus, Statistics};

const DEFAULT_ACTIVITY_LIMIT: u32 = 10;
const DEFAULT_RECENT_CASES: u32 = 5;

/// GET /api/dashboard/statistics
pub async fn statistics(State(state): State<AppState>) -> ApiResult<Statistics> {
    Ok(ApiResponse::success(stats::statistics(state.store.as_ref()).await?))
}

/// GET /api/dashboard/recent-activity?limit=10
pub async fn recent_activity(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<ActivityEntry>> {
    let limit = latest_limit(&params, DEFAULT_ACTIVITY_LIMIT, state.config.api.max_page_size);
    Ok(ApiResponse::success(state.store.recent_activity(limit).await?))
}

/// GET /api/dashboard/case-distribution
pub async fn case_distribution(State(state): State<AppState>) -> ApiResult<CaseDistribution> {
    Ok(ApiResponse::success(stats::case_distribution(state.store.as_ref()).await?))
}

/// GET /api/dashboard/recent-cases?limit=5
pub async fn recent_cases(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Case>> {
    let limit = latest_limit(&params, DEFAULT_RECENT_CASES, state.config.api.max_page_size);
    let cases = state.store.list_cases(&Filter::default(), Page::first(limit)).await?;
    Ok(ApiResponse::success(cases.items))
}

/// GET /api/dashboard/personnel-status
pub async fn personnel_status(State(state): State<AppState>) -> ApiResult<PersonnelStatus> {
    Ok(ApiResponse::success(stats::personnel_status(state.store.as_ref()).await?))
}
