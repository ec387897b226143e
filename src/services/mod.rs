pub mod board;
pub mod ledger;
pub mod profile;
pub mod selector;
pub mod session;

pub use board::{BoardTab, PoolBoard, PoolSummary};
pub use ledger::{QuickStake, StakeLedger};
pub use profile::{GameOutcome, GameRecord, PlayerStats, ProfileService};
pub use selector::{RandomSource, RngSource, WinnerSelector};
pub use session::PoolSession;
