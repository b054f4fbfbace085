// handlers/public/health.rs - GET /, GET /health, GET /api/health

use axum::extract::State;
use chrono::Utc;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - Service banner with the route map
pub async fn root(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": "Precinct Records API",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "endpoints": {
            "health": "/health, /api/health (public)",
            "auth": "/api/auth/login, /api/auth/register (public); /api/auth/me, /api/auth/profile, /api/auth/password (protected)",
            "cases": "/api/cases[/:id] (protected)",
            "officers": "/api/officers[/:badge] (protected)",
            "reports": "/api/reports[/:id[/pdf]] (protected)",
            "incidents": "/api/incidents[/:id] (protected)",
            "users": "/api/users[/:id] (protected, admin)",
            "dashboard": "/api/dashboard/* (protected)"
        }
    })))
}

/// GET /health - Liveness plus a storage round-trip
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    if let Err(e) = state.store.ping().await {
        tracing::error!("Health check failed: {}", e);
        return Err(ApiError::ServiceUnavailable("Database unavailable".to_string()));
    }

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "database": "connected",
        "timestamp": Utc::now(),
    })))
}
