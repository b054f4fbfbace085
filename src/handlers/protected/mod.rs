// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind `jwt_auth_middleware`, which resolves the
// caller into an `AuthUser` extension. Admin-only routes add `require_admin`
// as a route layer; rules that depend on the target account are checked in
// the handler.
pub mod auth;
pub mod cases;
pub mod dashboard;
pub mod incidents;
pub mod officers;
pub mod reports;
pub mod users;
