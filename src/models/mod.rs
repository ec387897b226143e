//! Domain models for the pool engine.

pub mod pool;
pub mod settlement;
pub mod stake;

pub use pool::{remaining_until, Pool, PoolId, PoolStatus};
pub use settlement::{ConsolationCredit, Currency, Settlement};
pub use stake::Stake;
