use super::{Settlement, Stake};
use crate::error::PoolError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub type PoolId = u64;

/// Pool lifecycle status. Ordering follows the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatus {
    Open,
    StakingClosed,
    Drawing,
    Settled,
}

impl PoolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolStatus::Open => "open",
            PoolStatus::StakingClosed => "staking_closed",
            PoolStatus::Drawing => "drawing",
            PoolStatus::Settled => "settled",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "open" => Ok(PoolStatus::Open),
            "staking_closed" => Ok(PoolStatus::StakingClosed),
            "drawing" => Ok(PoolStatus::Drawing),
            "settled" => Ok(PoolStatus::Settled),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }

    /// The only status this one may move to. `Settled` is terminal.
    pub fn next(&self) -> Option<PoolStatus> {
        match self {
            PoolStatus::Open => Some(PoolStatus::StakingClosed),
            PoolStatus::StakingClosed => Some(PoolStatus::Drawing),
            PoolStatus::Drawing => Some(PoolStatus::Settled),
            PoolStatus::Settled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A time-boxed wager pool.
///
/// The roster and status are only reachable through methods so the pot
/// can never drift from the stakes and the status only moves forward.
/// Serialize-only: a pool is rebuilt through `new` and `join`, never decoded.
#[derive(Debug, Clone, Serialize)]
pub struct Pool {
    pub id: PoolId,
    pub min_entry: Decimal,
    pub closes_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    status: PoolStatus,
    participants: Vec<Stake>,
    settlement: Option<Settlement>,
}

impl Pool {
    /// Create a new open pool; `now` comes from the caller's clock
    pub fn new(
        id: PoolId,
        min_entry: Decimal,
        closes_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, PoolError> {
        if min_entry <= Decimal::ZERO {
            return Err(PoolError::InvalidMinimum(min_entry));
        }

        Ok(Self {
            id,
            min_entry,
            closes_at,
            created_at: now,
            status: PoolStatus::Open,
            participants: Vec::new(),
            settlement: None,
        })
    }

    pub fn status(&self) -> PoolStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == PoolStatus::Open
    }

    /// Stakes in join order
    pub fn participants(&self) -> &[Stake] {
        &self.participants
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Sum of every recorded stake
    pub fn total_pot(&self) -> Decimal {
        self.participants.iter().map(|s| s.amount).sum()
    }

    pub fn has_stake(&self, wallet_address: &str) -> bool {
        self.participants
            .iter()
            .any(|s| s.wallet_address == wallet_address)
    }

    pub fn stake_of(&self, wallet_address: &str) -> Option<&Stake> {
        self.participants
            .iter()
            .find(|s| s.wallet_address == wallet_address)
    }

    /// What a new stake of `amount` would win if it took the whole pot
    pub fn potential_winnings(&self, amount: Decimal) -> Decimal {
        self.total_pot() + amount
    }

    /// Time left until `closes_at`, zero once the deadline has passed
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        remaining_until(self.closes_at, now)
    }

    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.closes_at
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    /// Move to the next lifecycle status. Skips and backward moves are rejected.
    pub fn advance(&mut self, to: PoolStatus) -> Result<(), PoolError> {
        if self.status.next() != Some(to) {
            return Err(PoolError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        if to == PoolStatus::Settled && self.settlement.is_none() {
            return Err(PoolError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Store the draw result and move `Drawing -> Settled`
    pub fn settle(&mut self, settlement: Settlement) -> Result<(), PoolError> {
        if self.settlement.is_some() || self.status == PoolStatus::Settled {
            return Err(PoolError::AlreadyDrawn(self.id));
        }
        if self.status != PoolStatus::Drawing {
            return Err(PoolError::DrawNotReady {
                pool_id: self.id,
                status: self.status,
            });
        }
        if settlement.pool_id != self.id || !self.participants.contains(&settlement.winner) {
            return Err(PoolError::InvalidTransition {
                from: self.status,
                to: PoolStatus::Settled,
            });
        }

        self.settlement = Some(settlement);
        self.advance(PoolStatus::Settled)
    }

    pub(crate) fn record_stake(&mut self, stake: Stake) {
        self.participants.push(stake);
    }
}

/// Non-negative time between `now` and `deadline`
pub fn remaining_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (deadline - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn open_pool() -> Pool {
        let now = Utc::now();
        Pool::new(28, Decimal::new(5, 0), now + ChronoDuration::seconds(60), now).unwrap()
    }

    #[test]
    fn test_status_conversion() {
        assert_eq!(PoolStatus::StakingClosed.as_str(), "staking_closed");
        assert_eq!(PoolStatus::from_str("DRAWING").unwrap(), PoolStatus::Drawing);
        assert!(PoolStatus::from_str("paused").is_err());
    }

    #[test]
    fn test_status_order_follows_lifecycle() {
        assert!(PoolStatus::Open < PoolStatus::StakingClosed);
        assert!(PoolStatus::Drawing < PoolStatus::Settled);
        assert!(PoolStatus::Settled.is_terminal());
    }

    #[test]
    fn test_new_pool_rejects_non_positive_minimum() {
        let now = Utc::now();
        let err = Pool::new(1, Decimal::ZERO, now, now).unwrap_err();
        assert_eq!(err, PoolError::InvalidMinimum(Decimal::ZERO));
    }

    #[test]
    fn test_advance_rejects_skips_and_backward_moves() {
        let mut pool = open_pool();
        assert!(pool.advance(PoolStatus::Drawing).is_err());
        pool.advance(PoolStatus::StakingClosed).unwrap();
        assert!(pool.advance(PoolStatus::Open).is_err());
        pool.advance(PoolStatus::Drawing).unwrap();
        // Settled needs a settlement
        assert!(pool.advance(PoolStatus::Settled).is_err());
        assert_eq!(pool.status(), PoolStatus::Drawing);
    }

    #[test]
    fn test_remaining_clamps_at_zero() {
        let pool = open_pool();
        let later = pool.closes_at + ChronoDuration::seconds(5);
        assert_eq!(pool.remaining(later), Duration::ZERO);
        assert!(pool.has_expired(later));
        assert_eq!(
            pool.remaining(pool.closes_at - ChronoDuration::seconds(2)),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn test_created_at_is_caller_time() {
        let now = DateTime::parse_from_rfc3339("2025-10-27T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let pool = Pool::new(3, Decimal::ONE, now + ChronoDuration::seconds(30), now).unwrap();
        assert_eq!(pool.created_at, now);
        assert_eq!(pool.remaining(pool.created_at), Duration::from_secs(30));
    }

    #[test]
    fn test_potential_winnings_adds_to_pot() {
        let mut pool = open_pool();
        pool.record_stake(Stake::new("0x01", Decimal::new(10, 0)));
        assert_eq!(pool.potential_winnings(Decimal::new(7, 0)), Decimal::new(17, 0));
    }

    #[test]
    fn test_pool_serializes_for_snapshots() {
        let mut pool = open_pool();
        pool.record_stake(Stake::new("0x01", Decimal::new(10, 0)));
        let json = serde_json::to_value(&pool).unwrap();
        assert_eq!(json["status"], "open");
        assert_eq!(json["participants"].as_array().unwrap().len(), 1);
        assert!(json["settlement"].is_null());
    }
}
