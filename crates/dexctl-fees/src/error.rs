//! Fee error types.

use crate::tier::TierKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeError {
    #[error("No {kind} fee tier at min_holdings={min_holdings}")]
    TierNotFound { kind: TierKind, min_holdings: u64 },

    #[error("Core error: {0}")]
    Core(#[from] dexctl_core::CoreError),
}

pub type FeeResult<T> = Result<T, FeeError>;
