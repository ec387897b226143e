//! Draw results and payouts

use super::{PoolId, Stake};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Units amounts are denominated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Stake currency; the pot is paid out in it
    Flow,
    /// Consolation token credited to non-winners
    Ioo,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Flow => "FLOW",
            Currency::Ioo => "IOO",
        }
    }
}

/// Credit owed to a non-winning participant, 1:1 with their stake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolationCredit {
    pub wallet_address: String,
    pub amount: Decimal,
    pub currency: Currency,
}

/// Outcome of a pool draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Uuid,
    pub pool_id: PoolId,
    pub winner: Stake,
    /// Entire pot, in FLOW
    pub payout: Decimal,
    pub consolation: Vec<ConsolationCredit>,
    pub participants: usize,
    pub settled_at: DateTime<Utc>,
}

impl Settlement {
    /// Build a settlement awarding the pot to `roster[winner_index]`
    pub fn from_roster(
        pool_id: PoolId,
        roster: &[Stake],
        winner_index: usize,
        settled_at: DateTime<Utc>,
    ) -> Option<Self> {
        let winner = roster.get(winner_index)?.clone();
        let payout = roster.iter().map(|s| s.amount).sum();
        let consolation = roster
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != winner_index)
            .map(|(_, stake)| ConsolationCredit {
                wallet_address: stake.wallet_address.clone(),
                amount: stake.amount,
                currency: Currency::Ioo,
            })
            .collect();

        Some(Self {
            id: Uuid::new_v4(),
            pool_id,
            winner,
            payout,
            consolation,
            participants: roster.len(),
            settled_at,
        })
    }

    pub fn is_winner(&self, wallet_address: &str) -> bool {
        self.winner.wallet_address == wallet_address
    }

    pub fn consolation_for(&self, wallet_address: &str) -> Option<&ConsolationCredit> {
        self.consolation
            .iter()
            .find(|c| c.wallet_address == wallet_address)
    }
}
