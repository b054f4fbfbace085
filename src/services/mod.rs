pub mod accounts;
pub mod activity;
pub mod stats;
