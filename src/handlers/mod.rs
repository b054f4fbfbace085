// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (Bearer JWT, admin-only routes add the role gate)
pub mod protected;
pub mod public;
pub mod utils;
