// handlers/protected/incidents.rs - /api/incidents

use std::collections::HashMap;

use axum::extract::{Extension, Path, Query, State};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Incident, IncidentStatus, Priority};
use crate::error::{ApiError, Resource};
use crate::filter::{resources::INCIDENT_FILTERS, Pagination};
use crate::handlers::utils::{explicit_null, list_params, parse_enum, require_fields, text};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::services::{accounts::non_blank, activity};

#[derive(Debug, Default, Deserialize)]
pub struct IncidentPayload {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub incident_type: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// `null` clears a stored coordinate on update
    #[serde(default, deserialize_with = "explicit_null")]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub longitude: Option<Option<f64>>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub case_id: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

/// GET /api/incidents - status, type, severity, case, search, page, limit
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Incident>> {
    let (filter, page) = list_params(&state, &INCIDENT_FILTERS, &params);
    let result = state.store.list_incidents(&filter, page).await?;
    Ok(ApiResponse::paginated(result.items, Pagination::new(page, result.total)))
}

async fn find(state: &AppState, raw_id: &str) -> Result<Incident, ApiError> {
    let not_found = || ApiError::not_found(Resource::Incident, raw_id);
    let id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
    state.store.find_incident(id).await?.ok_or_else(not_found)
}

/// GET /api/incidents/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Incident> {
    Ok(ApiResponse::success(find(&state, &id).await?))
}

/// POST /api/incidents
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<IncidentPayload>,
) -> ApiResult<Incident> {
    require_fields(&[
        ("title", payload.title.as_deref()),
        ("type", payload.incident_type.as_deref()),
        ("location", payload.location.as_deref()),
    ])?;
    let severity = parse_enum::<Priority>("severity", payload.severity.as_deref())?.unwrap_or(Priority::Medium);
    let status = parse_enum::<IncidentStatus>("status", payload.status.as_deref())?.unwrap_or(IncidentStatus::Reported);
    let latitude = payload.latitude.flatten();
    let longitude = payload.longitude.flatten();
    check_coordinates(latitude, longitude)?;
    let case_id = linked_case(&state, payload.case_id).await?;

    let now = Utc::now();
    let incident = Incident {
        id: Uuid::new_v4(),
        title: text(payload.title),
        incident_type: text(payload.incident_type),
        description: non_blank(payload.description),
        location: text(payload.location),
        latitude,
        longitude,
        severity,
        status,
        case_id,
        reported_by: auth_user.id,
        occurred_at: payload.occurred_at.unwrap_or(now),
        created_at: now,
        updated_at: now,
    };

    state.store.insert_incident(&incident).await?;
    activity::record(state.store.as_ref(), &auth_user, "create", "incident", &incident.id.to_string()).await?;

    Ok(ApiResponse::created(incident))
}

/// PATCH /api/incidents/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<IncidentPayload>,
) -> ApiResult<Incident> {
    let mut incident = find(&state, &id).await?;

    if let Some(severity) = parse_enum::<Priority>("severity", payload.severity.as_deref())? {
        incident.severity = severity;
    }
    if let Some(status) = parse_enum::<IncidentStatus>("status", payload.status.as_deref())? {
        incident.status = status;
    }

    let latitude = payload.latitude.unwrap_or(incident.latitude);
    let longitude = payload.longitude.unwrap_or(incident.longitude);
    check_coordinates(latitude, longitude)?;
    incident.latitude = latitude;
    incident.longitude = longitude;

    if payload.case_id.is_some() {
        incident.case_id = linked_case(&state, payload.case_id).await?;
    }
    if payload.description.is_some() {
        incident.description = non_blank(payload.description);
    }
    if let Some(title) = non_blank(payload.title) {
        incident.title = title;
    }
    if let Some(incident_type) = non_blank(payload.incident_type) {
        incident.incident_type = incident_type;
    }
    if let Some(location) = non_blank(payload.location) {
        incident.location = location;
    }
    if let Some(occurred_at) = payload.occurred_at {
        incident.occurred_at = occurred_at;
    }
    incident.updated_at = Utc::now();

    state.store.update_incident(&incident).await?;
    activity::record(state.store.as_ref(), &auth_user, "update", "incident", &incident.id.to_string()).await?;

    Ok(ApiResponse::success(incident))
}

/// DELETE /api/incidents/:id (admin)
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let incident = find(&state, &id).await?;
    if !state.store.delete_incident(incident.id).await? {
        return Err(ApiError::not_found(Resource::Incident, &id));
    }
    activity::record(state.store.as_ref(), &auth_user, "delete", "incident", &id).await?;

    Ok(ApiResponse::success(json!({ "id": incident.id, "deleted": true })))
}

/// Blank unlinks; otherwise the case must exist
async fn linked_case(state: &AppState, case_id: Option<String>) -> Result<Option<String>, ApiError> {
    let Some(case_id) = non_blank(case_id) else {
        return Ok(None);
    };
    if state.store.find_case(&case_id).await?.is_none() {
        return Err(ApiError::not_found(Resource::Case, case_id));
    }
    Ok(Some(case_id))
}

fn check_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), ApiError> {
    if let Some(lat) = latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ApiError::validation_error("latitude must be between -90 and 90"));
        }
    }
    if let Some(lon) = longitude {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ApiError::validation_error("longitude must be between -180 and 180"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_coordinates_differ_from_absent_ones() {
        let absent: IncidentPayload = serde_json::from_value(json!({ "status": "closed" })).unwrap();
        assert_eq!(absent.latitude, None);

        let cleared: IncidentPayload = serde_json::from_value(json!({ "latitude": null, "longitude": 7.4 })).unwrap();
        assert_eq!(cleared.latitude, Some(None));
        assert_eq!(cleared.longitude, Some(Some(7.4)));
    }

    #[test]
    fn coordinates_are_range_checked() {
        assert!(check_coordinates(Some(9.07), Some(7.49)).is_ok());
        assert!(check_coordinates(None, None).is_ok());
        assert!(check_coordinates(Some(91.0), None).is_err());
        assert!(check_coordinates(None, Some(-180.5)).is_err());
    }
}
