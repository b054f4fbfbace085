use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::Store;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin};

/// Shared, immutable state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let mut router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .with_state(state.clone())
        .layer(cors);

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

fn public_routes() -> Router<AppState> {
    use public::{auth, health};

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/api/health", get(health::health))
        .route("/api/auth/login", post(auth::login_post))
        .route("/api/auth/register", post(auth::register_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, cases, dashboard, incidents, officers, reports, users};

    let admin = || middleware::from_fn(require_admin);

    Router::new()
        // Session
        .route("/api/auth/me", get(auth::me_get))
        .route("/api/auth/profile", patch(auth::profile_patch))
        .route("/api/auth/password", put(auth::password_put))
        // Cases
        .route("/api/cases", get(cases::list).post(cases::create))
        .route(
            "/api/cases/:id",
            get(cases::show)
                .patch(cases::update)
                .merge(delete(cases::remove).route_layer(admin())),
        )
        // Officers
        .route("/api/officers", get(officers::list).post(officers::create))
        .route(
            "/api/officers/:badge",
            get(officers::show)
                .patch(officers::update)
                .merge(delete(officers::remove).route_layer(admin())),
        )
        // Reports
        .route("/api/reports", get(reports::list).post(reports::create))
        .route(
            "/api/reports/:id",
            get(reports::show).merge(delete(reports::remove).route_layer(admin())),
        )
        .route("/api/reports/:id/pdf", get(reports::pdf))
        // Incidents
        .route("/api/incidents", get(incidents::list).post(incidents::create))
        .route(
            "/api/incidents/:id",
            get(incidents::show)
                .patch(incidents::update)
                .merge(delete(incidents::remove).route_layer(admin())),
        )
        // Users
        .route("/api/users", get(users::list).post(users::create).route_layer(admin()))
        .route(
            "/api/users/:id",
            get(users::show)
                .patch(users::update)
                .merge(delete(users::remove).route_layer(admin())),
        )
        // Dashboard
        .route("/api/dashboard/statistics", get(dashboard::statistics))
        .route("/api/dashboard/recent-activity", get(dashboard::recent_activity))
        .route("/api/dashboard/case-distribution", get(dashboard::case_distribution))
        .route("/api/dashboard/recent-cases", get(dashboard::recent_cases))
        .route("/api/dashboard/personnel-status", get(dashboard::personnel_status))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(allowed)
}
