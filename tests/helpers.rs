#![allow(dead_code)]

use chrono::{DateTime, Utc};
use inorout_backend::clock::{Clock, TokioClock};
use inorout_backend::config::SessionConfig;
use inorout_backend::events::PoolEvent;
use inorout_backend::models::{Pool, PoolId};
use inorout_backend::services::{PoolBoard, PoolSession, RandomSource, WinnerSelector};
use inorout_backend::wallet::WalletSession;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};

/// Fixed origin so timestamps are stable across runs
pub fn origin() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-10-27T12:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

/// Random source that replays a fixed list of indices
pub struct Scripted {
    picks: Vec<usize>,
    next: usize,
}

impl Scripted {
    pub fn new(picks: Vec<usize>) -> Self {
        Self { picks, next: 0 }
    }
}

impl RandomSource for Scripted {
    fn pick_index(&mut self, len: usize) -> usize {
        let pick = self.picks[self.next % self.picks.len()];
        self.next += 1;
        pick % len
    }
}

pub fn wallet(address: &str, balance: i64) -> WalletSession {
    WalletSession::connected(address, Decimal::new(balance, 0))
}

pub fn flow(amount: i64) -> Decimal {
    Decimal::new(amount, 0)
}

/// Session config with short, non-zero pacing
pub fn fast_config() -> SessionConfig {
    SessionConfig {
        tick_interval_ms: 1000,
        analyzing_delay_secs: 5,
        result_display_secs: 15,
        event_buffer: 256,
    }
}

pub struct TestPool {
    pub clock: Arc<dyn Clock>,
    pub session: Arc<PoolSession>,
}

impl TestPool {
    /// Pool closing `closes_in` after the virtual clock's origin
    pub fn new(id: PoolId, min_entry: i64, closes_in: Duration, selector: WinnerSelector, config: SessionConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(TokioClock::starting_at(origin()));
        let now = clock.now();
        let closes_at = now + chrono::Duration::from_std(closes_in).expect("duration in range");
        let pool = Pool::new(id, flow(min_entry), closes_at, now).expect("valid pool");
        let session = Arc::new(PoolSession::new(
            pool,
            clock.clone(),
            Arc::new(Mutex::new(selector)),
            config,
        ));
        Self { clock, session }
    }

    pub fn seeded(id: PoolId, closes_in_secs: u64) -> Self {
        Self::new(
            id,
            5,
            Duration::from_secs(closes_in_secs),
            WinnerSelector::seeded(42),
            fast_config(),
        )
    }
}

pub fn board(seed: u64, config: SessionConfig) -> PoolBoard {
    PoolBoard::new(
        Arc::new(TokioClock::starting_at(origin())),
        WinnerSelector::seeded(seed),
        config,
    )
}

/// Collect non-tick events until `stop` matches
pub async fn collect_until<F>(rx: &mut broadcast::Receiver<PoolEvent>, stop: F) -> Vec<PoolEvent>
where
    F: Fn(&PoolEvent) -> bool,
{
    let mut seen = Vec::new();
    loop {
        let event = rx.recv().await.expect("event stream open");
        let done = stop(&event);
        if !matches!(event, PoolEvent::Tick { .. }) {
            seen.push(event);
        }
        if done {
            return seen;
        }
    }
}
