//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (chunk size, default ports, etc.)
//! - CLI option types and parsing
//! - Cross-field validation of the parsed options

mod constants;
mod types;
mod validation;

// Re-export all constants
pub use constants::*;
pub use types::{Config, Dialect, ExportMode, LogFormat, LogLevel};
