//! Error types for dexctl-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Invalid scale: expected {expected} decimals, got {actual}")]
    InvalidScale { expected: u32, actual: u32 },

    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    #[error("Invalid asset type: {0}")]
    InvalidAssetType(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Result type alias for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
