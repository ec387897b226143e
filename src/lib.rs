//! InOrOut pool engine
//!
//! Time-boxed wager pools: wallets stake into an open pool, the countdown
//! closes staking, one participant is drawn uniformly at random and takes
//! the whole pot while everyone else is credited IOO 1:1 with their stake.

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod models;
pub mod network;
pub mod seed;
pub mod services;
pub mod wallet;

// Re-export commonly used types
pub use clock::{Clock, Countdown, ManualClock, SystemClock, TimerEvent, TokioClock};
pub use config::{AppConfig, SessionConfig};
pub use error::{AppError, AppResult, PoolError};
pub use events::{EventBus, PoolEvent};
pub use models::{ConsolationCredit, Currency, Pool, PoolId, PoolStatus, Settlement, Stake};
pub use services::{PoolBoard, PoolSession, StakeLedger, WinnerSelector};
pub use wallet::{MockWalletConnector, WalletSession};
