//! Seed pools and the house roster used to populate a fresh board

use crate::error::{AppResult, PoolError};
use crate::models::PoolId;
use crate::services::{PoolBoard, PoolSession};
use crate::wallet::WalletSession;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// House wallets and the stake each one places
pub const HOUSE_ROSTER: [(&str, i64); 5] = [
    ("0x1234567890abcdef", 10),
    ("0x2345678901bcdefg", 5),
    ("0x3456789012cdefgh", 15),
    ("0x4567890123defghi", 8),
    ("0x5678901234efghij", 12),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPool {
    pub id: PoolId,
    pub min_entry: i64,
    pub closes_in_secs: i64,
}

pub const SEED_POOLS: [SeedPool; 3] = [
    SeedPool { id: 28, min_entry: 5, closes_in_secs: 60 },
    SeedPool { id: 29, min_entry: 10, closes_in_secs: 45 },
    SeedPool { id: 30, min_entry: 2, closes_in_secs: 30 },
];

/// House wallets, each funded with exactly its stake
pub fn house_wallets() -> Vec<(WalletSession, Decimal)> {
    HOUSE_ROSTER
        .iter()
        .map(|(address, amount)| {
            let amount = Decimal::new(*amount, 0);
            (WalletSession::connected(*address, amount), amount)
        })
        .collect()
}

/// Stake the house roster into `session`, skipping wallets below the minimum
pub async fn seed_roster(session: &PoolSession) -> AppResult<usize> {
    let mut joined = 0;
    for (wallet, amount) in house_wallets() {
        match session.join(&wallet, amount).await {
            Ok(_) => joined += 1,
            Err(PoolError::BelowMinimum { .. }) => {
                debug!("House wallet {} sits out pool {}", wallet.address(), session.id());
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(joined)
}

/// Create the seed pools relative to `now` and fill them with the house roster
pub async fn seed_board(board: &PoolBoard, now: DateTime<Utc>) -> AppResult<Vec<Arc<PoolSession>>> {
    let mut sessions = Vec::with_capacity(SEED_POOLS.len());
    for seed in SEED_POOLS {
        let session = board
            .create_pool(
                seed.id,
                Decimal::new(seed.min_entry, 0),
                now + Duration::seconds(seed.closes_in_secs),
            )
            .await?;
        seed_roster(&session).await?;
        sessions.push(session);
    }
    Ok(sessions)
}
