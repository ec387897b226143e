use crate::models::{PoolId, PoolStatus};
use rust_decimal::Decimal;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Pool lifecycle errors
    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Get the underlying pool error, if any
    pub fn as_pool_error(&self) -> Option<&PoolError> {
        match self {
            AppError::Pool(e) => Some(e),
            _ => None,
        }
    }
}

/// Failures raised by the pool core.
///
/// Every variant is local and recoverable: the pool is left untouched and
/// the caller decides how to surface it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Pool {0} is not open for staking")]
    PoolNotOpen(PoolId),

    #[error("Stake {amount} is below the pool minimum of {min_entry}")]
    BelowMinimum { amount: Decimal, min_entry: Decimal },

    #[error("Stake {amount} exceeds available balance {available}")]
    InsufficientBalance { amount: Decimal, available: Decimal },

    #[error("Wallet {0} already holds a stake in this pool")]
    DuplicateStake(String),

    #[error("Wallet is not connected")]
    WalletNotConnected,

    #[error("Countdown is already running")]
    AlreadyRunning,

    #[error("Pool {0} has already been drawn")]
    AlreadyDrawn(PoolId),

    #[error("Pool {0} has no participants to draw from")]
    EmptyRoster(PoolId),

    #[error("Pool {0} is not settled yet")]
    NotSettled(PoolId),

    #[error("Pool {pool_id} cannot be drawn while {status}")]
    DrawNotReady { pool_id: PoolId, status: PoolStatus },

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: PoolStatus, to: PoolStatus },

    #[error("Minimum entry must be positive, got {0}")]
    InvalidMinimum(Decimal),

    #[error("Pool {0} already exists")]
    DuplicatePool(PoolId),
}

impl PoolError {
    /// Join-time validation failure; the stake was rejected and nothing changed.
    pub fn is_join_rejection(&self) -> bool {
        matches!(
            self,
            PoolError::PoolNotOpen(_)
                | PoolError::BelowMinimum { .. }
                | PoolError::InsufficientBalance { .. }
                | PoolError::DuplicateStake(_)
                | PoolError::WalletNotConnected
        )
    }

    /// Sequencing or precondition violation, usually a caller bug or a race.
    pub fn is_sequencing(&self) -> bool {
        matches!(
            self,
            PoolError::AlreadyRunning
                | PoolError::AlreadyDrawn(_)
                | PoolError::EmptyRoster(_)
                | PoolError::NotSettled(_)
                | PoolError::DrawNotReady { .. }
                | PoolError::InvalidTransition { .. }
        )
    }
}
