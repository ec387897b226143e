use crate::models::{PoolId, Settlement};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Win,
    Lost,
}

/// One wallet's result in one pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub pool_id: PoolId,
    pub outcome: GameOutcome,
    pub staked: Decimal,
    pub flow_won: Decimal,
    pub ioo_earned: Decimal,
    pub played_at: DateTime<Utc>,
}

/// Aggregate profile numbers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    pub total_games: usize,
    pub total_wins: usize,
    /// Percentage with one decimal place
    pub win_rate: Decimal,
    pub total_flow_won: Decimal,
    pub total_ioo_earned: Decimal,
}

/// Game history per wallet, fed from settlements
pub struct ProfileService {
    history: RwLock<HashMap<String, Vec<GameRecord>>>,
}

impl ProfileService {
    pub fn new() -> Self {
        Self {
            history: RwLock::new(HashMap::new()),
        }
    }

    /// Record the outcome for every participant of a settled pool
    pub async fn record_settlement(&self, settlement: &Settlement) {
        let mut history = self.history.write().await;

        let winner = &settlement.winner;
        history
            .entry(winner.wallet_address.clone())
            .or_default()
            .push(GameRecord {
                pool_id: settlement.pool_id,
                outcome: GameOutcome::Win,
                staked: winner.amount,
                flow_won: settlement.payout,
                ioo_earned: Decimal::ZERO,
                played_at: settlement.settled_at,
            });

        for credit in &settlement.consolation {
            history
                .entry(credit.wallet_address.clone())
                .or_default()
                .push(GameRecord {
                    pool_id: settlement.pool_id,
                    outcome: GameOutcome::Lost,
                    staked: credit.amount,
                    flow_won: Decimal::ZERO,
                    ioo_earned: credit.amount,
                    played_at: settlement.settled_at,
                });
        }

        debug!(
            "Recorded pool {} for {} wallets",
            settlement.pool_id, settlement.participants
        );
    }

    /// Newest first
    pub async fn history(&self, wallet_address: &str) -> Vec<GameRecord> {
        let history = self.history.read().await;
        let mut records = history.get(wallet_address).cloned().unwrap_or_default();
        records.sort_by(|a, b| b.played_at.cmp(&a.played_at).then(b.pool_id.cmp(&a.pool_id)));
        records
    }

    pub async fn stats(&self, wallet_address: &str) -> PlayerStats {
        let history = self.history.read().await;
        let records = match history.get(wallet_address) {
            Some(r) if !r.is_empty() => r,
            _ => return PlayerStats::default(),
        };

        let total_games = records.len();
        let total_wins = records
            .iter()
            .filter(|r| r.outcome == GameOutcome::Win)
            .count();
        let win_rate = (Decimal::from(total_wins as u64) * Decimal::ONE_HUNDRED
            / Decimal::from(total_games as u64))
        .round_dp(1);

        PlayerStats {
            total_games,
            total_wins,
            win_rate,
            total_flow_won: records.iter().map(|r| r.flow_won).sum(),
            total_ioo_earned: records.iter().map(|r| r.ioo_earned).sum(),
        }
    }
}

impl Default for ProfileService {
    fn default() -> Self {
        Self::new()
    }
}
