use crate::error::PoolError;
use crate::models::{Pool, Stake};
use crate::wallet::WalletSession;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Stake bookkeeping for a pool
pub struct StakeLedger;

impl StakeLedger {
    /// Record a stake for `wallet` and return the new pot.
    ///
    /// A pool whose deadline has passed is treated as closed even if the
    /// countdown has not delivered its expiry yet.
    pub fn join(
        pool: &mut Pool,
        wallet: &WalletSession,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Decimal, PoolError> {
        if !pool.is_open() || pool.has_expired(now) {
            return Err(PoolError::PoolNotOpen(pool.id));
        }

        if !wallet.is_connected() {
            return Err(PoolError::WalletNotConnected);
        }

        if amount < pool.min_entry {
            return Err(PoolError::BelowMinimum {
                amount,
                min_entry: pool.min_entry,
            });
        }

        let available = wallet.available_balance();
        if amount > available {
            return Err(PoolError::InsufficientBalance { amount, available });
        }

        if pool.has_stake(wallet.address()) {
            debug!("Duplicate stake from {} in pool {}", wallet.address(), pool.id);
            return Err(PoolError::DuplicateStake(wallet.address().to_string()));
        }

        pool.record_stake(Stake::at(wallet.address(), amount, now));
        let pot = Self::total_pot(pool);

        info!(
            "Pool {}: {} joined with {} FLOW (pot {}, {} players)",
            pool.id,
            wallet.address(),
            amount,
            pot,
            pool.participant_count()
        );

        Ok(pot)
    }

    pub fn total_pot(pool: &Pool) -> Decimal {
        pool.total_pot()
    }

    pub fn participant_count(pool: &Pool) -> usize {
        pool.participant_count()
    }
}

/// Preset stake sizes offered next to the amount field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickStake {
    Min,
    Quarter,
    Half,
    Max,
}

impl QuickStake {
    pub const ALL: [QuickStake; 4] = [QuickStake::Min, QuickStake::Quarter, QuickStake::Half, QuickStake::Max];

    /// Amount for this preset, rounded to 2 decimal places below `Max`
    pub fn amount(&self, min_entry: Decimal, balance: Decimal) -> Decimal {
        match self {
            QuickStake::Min => min_entry,
            QuickStake::Quarter => (balance * Decimal::new(25, 2)).round_dp(2),
            QuickStake::Half => (balance * Decimal::new(5, 1)).round_dp(2),
            QuickStake::Max => balance,
        }
    }
}
