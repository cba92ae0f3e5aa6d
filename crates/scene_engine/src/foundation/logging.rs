//! Logging utilities
//!
//! The engine logs through the `log` facade. Subsystems prefix their messages
//! with a bracketed tag (`[Scene]`, `[Collision]`, `[Physics]`, ...) so output
//! from different layers can be filtered with `RUST_LOG` and grep alike.

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// Only binaries call this. Library code and tests never install a logger.
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with a fallback filter used when `RUST_LOG`
/// is not set
pub fn init_with_default_filter(filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}
