pub mod filter;
pub mod resources;
pub mod types;

pub use filter::Filter;
pub use types::*;
