// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// Resource kinds that produce a dedicated `*_NOT_FOUND` code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Case,
    Officer,
    Report,
    Incident,
    User,
}

impl Resource {
    pub fn label(&self) -> &'static str {
        match self {
            Resource::Case => "Case",
            Resource::Officer => "Officer",
            Resource::Report => "Report",
            Resource::Incident => "Incident",
            Resource::User => "User",
        }
    }

    fn not_found_code(&self) -> &'static str {
        match self {
            Resource::Case => "CASE_NOT_FOUND",
            Resource::Officer => "OFFICER_NOT_FOUND",
            Resource::Report => "REPORT_NOT_FOUND",
            Resource::Incident => "INCIDENT_NOT_FOUND",
            Resource::User => "USER_NOT_FOUND",
        }
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    MissingFields(Vec<String>),
    ValidationError(String),
    InvalidEmail,
    WeakPassword(String),
    InvalidJson(String),
    SelfDelete,

    // 401 Unauthorized
    NoToken,
    InvalidToken,
    TokenExpired,
    UserNotFound,
    InvalidCredentials,
    InactiveUser,

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    ResourceNotFound(Resource, String),
    NotFound(String),

    // 409 Conflict
    DuplicateUsername,
    DuplicateEmail,
    DuplicateEntry(String),

    // 500 Internal Server Error
    InternalError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFields(_)
            | ApiError::ValidationError(_)
            | ApiError::InvalidEmail
            | ApiError::WeakPassword(_)
            | ApiError::InvalidJson(_)
            | ApiError::SelfDelete => StatusCode::BAD_REQUEST,
            ApiError::NoToken
            | ApiError::InvalidToken
            | ApiError::TokenExpired
            | ApiError::UserNotFound
            | ApiError::InvalidCredentials
            | ApiError::InactiveUser => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::ResourceNotFound(..) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DuplicateUsername | ApiError::DuplicateEmail | ApiError::DuplicateEntry(_) => {
                StatusCode::CONFLICT
            }
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::MissingFields(_) => "MISSING_FIELDS",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::InvalidEmail => "INVALID_EMAIL",
            ApiError::WeakPassword(_) => "WEAK_PASSWORD",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::SelfDelete => "SELF_DELETE",
            ApiError::NoToken => "NO_TOKEN",
            ApiError::InvalidToken => "INVALID_TOKEN",
            ApiError::TokenExpired => "TOKEN_EXPIRED",
            ApiError::UserNotFound => "USER_NOT_FOUND",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::InactiveUser => "INACTIVE_USER",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::ResourceNotFound(resource, _) => resource.not_found_code(),
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::DuplicateUsername => "DUPLICATE_USERNAME",
            ApiError::DuplicateEmail => "DUPLICATE_EMAIL",
            ApiError::DuplicateEntry(_) => "DUPLICATE_ENTRY",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::MissingFields(fields) => {
                format!("Missing required fields: {}", fields.join(", "))
            }
            ApiError::ValidationError(msg) => msg.clone(),
            ApiError::InvalidEmail => "Invalid email format".to_string(),
            ApiError::WeakPassword(msg) => msg.clone(),
            ApiError::InvalidJson(msg) => msg.clone(),
            ApiError::SelfDelete => "You cannot delete your own account".to_string(),
            ApiError::NoToken => "No token provided".to_string(),
            ApiError::InvalidToken => "Invalid token".to_string(),
            ApiError::TokenExpired => "Token has expired".to_string(),
            ApiError::UserNotFound => "User not found".to_string(),
            ApiError::InvalidCredentials => "Invalid username or password".to_string(),
            ApiError::InactiveUser => "Account is inactive".to_string(),
            ApiError::Forbidden(msg) => msg.clone(),
            ApiError::ResourceNotFound(resource, id) => {
                format!("{} '{}' not found", resource.label(), id)
            }
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::DuplicateUsername => "Username already exists".to_string(),
            ApiError::DuplicateEmail => "Email already exists".to_string(),
            ApiError::DuplicateEntry(msg) => msg.clone(),
            ApiError::InternalError(msg) => msg.clone(),
            ApiError::ServiceUnavailable(msg) => msg.clone(),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code(),
        });

        if let ApiError::MissingFields(fields) = self {
            body["fields"] = json!(fields);
        }

        body
    }
}

impl ApiError {
    pub fn missing_fields(fields: Vec<&str>) -> Self {
        ApiError::MissingFields(fields.into_iter().map(String::from).collect())
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        ApiError::ValidationError(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(resource: Resource, id: impl Into<String>) -> Self {
        ApiError::ResourceNotFound(resource, id.into())
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        ApiError::InternalError(message.into())
    }
}

impl From<crate::database::DatabaseError> for ApiError {
    fn from(err: crate::database::DatabaseError) -> Self {
        use crate::database::DatabaseError;

        match err {
            DatabaseError::NotFound(msg) => ApiError::NotFound(msg),
            DatabaseError::Conflict(msg) => {
                tracing::warn!("Unique constraint violation: {}", msg);
                ApiError::DuplicateEntry("A record with the same unique value already exists".to_string())
            }
            DatabaseError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                ApiError::ServiceUnavailable("Database temporarily unavailable".to_string())
            }
            other => {
                // Log the real error but return generic message
                tracing::error!("Database error: {}", other);
                ApiError::internal_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::auth::TokenError> for ApiError {
    fn from(err: crate::auth::TokenError) -> Self {
        use crate::auth::TokenError;

        match err {
            TokenError::Expired => ApiError::TokenExpired,
            TokenError::Invalid(msg) => {
                tracing::debug!("Rejected token: {}", msg);
                ApiError::InvalidToken
            }
            TokenError::MissingSecret | TokenError::Encoding(_) => {
                tracing::error!("Token configuration error: {}", err);
                ApiError::internal_error("Authentication is not configured")
            }
        }
    }
}

impl From<crate::auth::password::PasswordError> for ApiError {
    fn from(err: crate::auth::password::PasswordError) -> Self {
        tracing::error!("Password hashing error: {}", err);
        ApiError::internal_error("An error occurred while processing your request")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseError;

    #[test]
    fn resource_not_found_uses_resource_code() {
        let err = ApiError::not_found(Resource::Case, "CA-0009");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "CASE_NOT_FOUND");
        assert_eq!(err.message(), "Case 'CA-0009' not found");
    }

    #[test]
    fn missing_fields_lists_every_field() {
        let body = ApiError::missing_fields(vec!["type", "location"]).to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "MISSING_FIELDS");
        assert_eq!(body["fields"], json!(["type", "location"]));
    }

    #[test]
    fn database_conflict_maps_to_duplicate_entry() {
        let err: ApiError = DatabaseError::Conflict("cases_pkey".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "DUPLICATE_ENTRY");
    }

    #[test]
    fn database_query_error_is_hidden_from_clients() {
        let err: ApiError = DatabaseError::Query("syntax error at or near".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
        assert!(!err.message().contains("syntax"));
    }

    #[test]
    fn token_errors_are_unauthorized() {
        assert_eq!(ApiError::NoToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TokenExpired.error_code(), "TOKEN_EXPIRED");
        assert_eq!(ApiError::InactiveUser.status_code(), StatusCode::UNAUTHORIZED);
    }
}
