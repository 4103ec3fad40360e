//! Application configuration module
//!
//! Environment-driven settings plus the fixed constants of the
//! platform (roles, token lifetimes, message limits).

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
