//! Wallet session snapshot and a simulated wallet connector.
//!
//! The pool core only reads a [`WalletSession`]; it never debits or credits
//! it. Callers build the session explicitly and pass it into each operation.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time;
use tracing::info;

/// Read-only view of a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    address: Option<String>,
    balance: Decimal,
}

impl WalletSession {
    pub fn connected(address: impl Into<String>, balance: Decimal) -> Self {
        Self {
            address: Some(address.into()),
            balance,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            address: None,
            balance: Decimal::ZERO,
        }
    }

    /// Wallet address; empty when disconnected
    pub fn address(&self) -> &str {
        self.address.as_deref().unwrap_or_default()
    }

    pub fn available_balance(&self) -> Decimal {
        self.balance
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}

/// Simulated wallet provider: random address and balance after a short delay
pub struct MockWalletConnector {
    rng: ChaCha8Rng,
    connect_latency: Duration,
    refresh_latency: Duration,
}

impl MockWalletConnector {
    pub fn new() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(rng: ChaCha8Rng) -> Self {
        Self {
            rng,
            connect_latency: Duration::from_millis(1000),
            refresh_latency: Duration::from_millis(500),
        }
    }

    /// Set simulated network latency
    pub fn with_latency(mut self, connect: Duration, refresh: Duration) -> Self {
        self.connect_latency = connect;
        self.refresh_latency = refresh;
        self
    }

    /// Connect a fresh wallet
    pub async fn connect(&mut self) -> WalletSession {
        time::sleep(self.connect_latency).await;

        let address = self.generate_address();
        let balance = self.generate_balance();
        info!("Wallet connected: {} ({} FLOW)", address, balance);

        WalletSession::connected(address, balance)
    }

    /// Re-read the balance of a connected wallet
    pub async fn refresh_balance(&mut self, session: &WalletSession) -> WalletSession {
        if !session.is_connected() {
            return session.clone();
        }

        time::sleep(self.refresh_latency).await;
        WalletSession::connected(session.address(), self.generate_balance())
    }

    /// `0x` followed by 16 hex digits
    fn generate_address(&mut self) -> String {
        let mut bytes = [0u8; 8];
        self.rng.fill_bytes(&mut bytes);
        format!("0x{}", hex::encode(bytes))
    }

    /// Between 10 and 1000 FLOW with 4 decimal places
    fn generate_balance(&mut self) -> Decimal {
        Decimal::new(self.rng.gen_range(100_000..10_000_000), 4)
    }
}

impl Default for MockWalletConnector {
    fn default() -> Self {
        Self::new()
    }
}
