//! Control plane error types.

use dexctl_core::{Address, CoreError};
use dexctl_fees::FeeError;
use dexctl_registry::RegistryError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Caller {caller} is not the administrator")]
    NotAuthorized { caller: Address },

    #[error("Global configuration already initialized")]
    AlreadyInitialized,

    #[error("Global configuration not initialized")]
    NotInitialized,

    #[error("Fee error: {0}")]
    Fee(#[from] FeeError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flat failure reason, for callers that only need to branch on the cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotAuthorized,
    AlreadyInitialized,
    NotInitialized,
    MarketAlreadyExists,
    MarketNotFound,
    TierNotFound,
    InvalidScale,
    InvalidInput,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAuthorized => "not_authorized",
            Self::AlreadyInitialized => "already_initialized",
            Self::NotInitialized => "not_initialized",
            Self::MarketAlreadyExists => "market_already_exists",
            Self::MarketNotFound => "market_not_found",
            Self::TierNotFound => "tier_not_found",
            Self::InvalidScale => "invalid_scale",
            Self::InvalidInput => "invalid_input",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ControlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            Self::AlreadyInitialized => ErrorKind::AlreadyInitialized,
            Self::NotInitialized => ErrorKind::NotInitialized,
            Self::Fee(FeeError::TierNotFound { .. }) => ErrorKind::TierNotFound,
            Self::Fee(FeeError::Core(e)) | Self::Core(e) => core_kind(e),
            Self::Registry(RegistryError::MarketAlreadyExists(_)) => ErrorKind::MarketAlreadyExists,
            Self::Registry(RegistryError::MarketNotFound(_)) => ErrorKind::MarketNotFound,
            Self::Config(_) | Self::Json(_) => ErrorKind::Config,
        }
    }
}

fn core_kind(e: &CoreError) -> ErrorKind {
    match e {
        CoreError::InvalidScale { .. } => ErrorKind::InvalidScale,
        _ => ErrorKind::InvalidInput,
    }
}

pub type ControlResult<T> = Result<T, ControlError>;
