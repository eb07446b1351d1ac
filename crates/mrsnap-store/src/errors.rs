//! Error handling for mrsnap-store
//!
//! Wraps mrsnap-core ExError with store-specific helpers

use mrsnap_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a corrupt-cache error
pub fn cache_corrupt(path: &Path, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::CacheCorrupt)
        .with_op("cache_load")
        .with_path(path.display().to_string())
        .with_message(reason)
}

/// Create a serialization error
pub fn serialization_error(err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("cache_save")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    mrsnap_core::errors::io_error(operation, path.display().to_string(), err)
}
