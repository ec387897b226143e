use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One wallet's position in a pool. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    pub wallet_address: String,
    pub amount: Decimal,
    pub joined_at: DateTime<Utc>,
}

impl Stake {
    pub fn new(wallet_address: impl Into<String>, amount: Decimal) -> Self {
        Self::at(wallet_address, amount, Utc::now())
    }

    pub fn at(wallet_address: impl Into<String>, amount: Decimal, joined_at: DateTime<Utc>) -> Self {
        Self {
            wallet_address: wallet_address.into(),
            amount,
            joined_at,
        }
    }
}
