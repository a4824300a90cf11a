//! Error handling and exit codes.
//!
//! This module provides:
//! - Error type definitions for configuration, initialization, database and
//!   export failures
//! - The mapping from an error chain to a distinct process exit code
//!
//! Failures are fatal for the whole run. The only recoverable condition in an
//! export (a comment line that could not be written) is logged where it happens
//! and never surfaces as an error value.

mod types;

// Re-export public API
pub use types::{ConfigError, DatabaseError, ExportError, FailureSite, InitializationError};

/// Classifies an error chain by the first typed error found in it.
///
/// Errors are usually wrapped in `anyhow` context by the caller, so the whole
/// chain is searched rather than only the outermost error.
pub fn failure_site(err: &anyhow::Error) -> FailureSite {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            return e.into();
        }
        if let Some(e) = cause.downcast_ref::<ExportError>() {
            return e.into();
        }
        if let Some(e) = cause.downcast_ref::<DatabaseError>() {
            return e.into();
        }
        if cause.downcast_ref::<InitializationError>().is_some() {
            return FailureSite::Logger;
        }
    }
    FailureSite::Unclassified
}

/// Process exit code for an error chain.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    failure_site(err).code()
}
