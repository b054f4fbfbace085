use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use crate::database::models::Role;
use crate::error::ApiError;

use super::auth::AuthUser;

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_role(&self, role: Role) -> Result<(), ApiError> {
        if self.role == role {
            return Ok(());
        }
        tracing::warn!("'{}' ({}) denied, requires {}", self.username, self.role, role);
        Err(ApiError::forbidden(format!("Access denied. Requires {} role", role)))
    }

    /// Admins may act on any account, everyone else only on their own
    pub fn require_self_or_admin(&self, account_id: Uuid) -> Result<(), ApiError> {
        if self.id == account_id {
            return Ok(());
        }
        self.require_role(Role::Admin)
    }
}

/// Route layer for admin-only routes. Must run inside `jwt_auth_middleware`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_user = request.extensions().get::<AuthUser>().ok_or(ApiError::NoToken)?;
    auth_user.require_role(Role::Admin)?;
    Ok(next.run(request).await)
}
