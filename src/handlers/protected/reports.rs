// handlers/protected/reports.rs - /api/reports (immutable once generated)

use std::collections::HashMap;
use std::fmt::Write as _;

use axum::{
    extract::{Extension, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::Report;
use crate::database::sequence::{self, SequenceKind};
use crate::error::{ApiError, Resource};
use crate::filter::{resources::REPORT_FILTERS, Pagination};
use crate::handlers::utils::{list_params, require_fields, text};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::services::{accounts::non_blank, activity};

#[derive(Debug, Default, Deserialize)]
pub struct ReportPayload {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub content: Option<String>,
    pub case_id: Option<String>,
}

/// GET /api/reports - type, case, search, page, limit
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Report>> {
    let (filter, page) = list_params(&state, &REPORT_FILTERS, &params);
    let result = state.store.list_reports(&filter, page).await?;
    Ok(ApiResponse::paginated(result.items, Pagination::new(page, result.total)))
}

async fn find(state: &AppState, report_id: &str) -> Result<Report, ApiError> {
    state
        .store
        .find_report(report_id)
        .await?
        .ok_or_else(|| ApiError::not_found(Resource::Report, report_id))
}

/// GET /api/reports/:id
pub async fn show(State(state): State<AppState>, Path(report_id): Path<String>) -> ApiResult<Report> {
    Ok(ApiResponse::success(find(&state, &report_id).await?))
}

/// POST /api/reports - Generate a report under the next `RPT-####` code
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<ReportPayload>,
) -> ApiResult<Report> {
    require_fields(&[
        ("title", payload.title.as_deref()),
        ("type", payload.report_type.as_deref()),
        ("content", payload.content.as_deref()),
    ])?;

    let case_id = non_blank(payload.case_id);
    if let Some(case_id) = &case_id {
        if state.store.find_case(case_id).await?.is_none() {
            return Err(ApiError::not_found(Resource::Case, case_id));
        }
    }

    let report = Report {
        report_id: sequence::allocate(state.store.as_ref(), SequenceKind::Report).await?,
        title: text(payload.title),
        report_type: text(payload.report_type),
        content: payload.content.unwrap_or_default(),
        case_id,
        generated_by: auth_user.id,
        created_at: Utc::now(),
    };

    state.store.insert_report(&report).await?;
    activity::record(state.store.as_ref(), &auth_user, "create", "report", &report.report_id).await?;

    Ok(ApiResponse::created(report))
}

/// DELETE /api/reports/:id (admin)
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(report_id): Path<String>,
) -> ApiResult<Value> {
    if !state.store.delete_report(&report_id).await? {
        return Err(ApiError::not_found(Resource::Report, &report_id));
    }
    activity::record(state.store.as_ref(), &auth_user, "delete", "report", &report_id).await?;

    Ok(ApiResponse::success(json!({ "report_id": report_id, "deleted": true })))
}

/// GET /api/reports/:id/pdf - Plain-text rendering served as a download
pub async fn pdf(State(state): State<AppState>, Path(report_id): Path<String>) -> Result<Response, ApiError> {
    let report = find(&state, &report_id).await?;
    let author = state
        .store
        .find_account(report.generated_by)
        .await?
        .map(|account| account.name)
        .unwrap_or_else(|| report.generated_by.to_string());

    let body = render_report(&report, &author);
    let disposition = format!("attachment; filename=\"{}.txt\"", report.report_id);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub fn render_report(report: &Report, author: &str) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "REPORT {}", report.report_id);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Title:        {}", report.title);
    let _ = writeln!(out, "Type:         {}", report.report_type);
    let _ = writeln!(out, "Case:         {}", report.case_id.as_deref().unwrap_or("N/A"));
    let _ = writeln!(out, "Generated by: {}", author);
    let _ = writeln!(out, "Generated at: {}", report.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "{}", "-".repeat(60));
    let _ = writeln!(out, "{}", report.content);

    out
}
