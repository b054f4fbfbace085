pub mod auth;
pub mod json;
pub mod response;
pub mod role;

pub use auth::{jwt_auth_middleware, verify_token, AuthUser};
pub use json::ApiJson;
pub use response::{ApiResponse, ApiResult};
pub use role::require_admin;
