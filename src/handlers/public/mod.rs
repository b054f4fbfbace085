// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Health probes plus token acquisition.
pub mod auth;
pub mod health;
