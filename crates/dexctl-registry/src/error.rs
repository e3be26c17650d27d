//! Registry error types.

use dexctl_core::MarketKey;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Market already exists: {0}")]
    MarketAlreadyExists(MarketKey),

    #[error("Market not found: {0}")]
    MarketNotFound(MarketKey),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
