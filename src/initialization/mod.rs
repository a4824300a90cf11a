//! Application initialization.
//!
//! Process-wide setup that has to happen before an export run starts.

mod logger;

// Re-export public API
pub use logger::init_logger_with;
