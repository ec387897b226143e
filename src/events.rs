//! Pool state-change notifications for the presentation layer.

use crate::error::AppResult;
use crate::models::{PoolId, PoolStatus, Settlement};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Pool event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PoolEvent {
    #[serde(rename = "tick")]
    Tick {
        pool_id: PoolId,
        remaining_secs: u64,
    },
    #[serde(rename = "stake_joined")]
    StakeJoined {
        pool_id: PoolId,
        wallet: String,
        amount: Decimal,
        total_pot: Decimal,
        participants: usize,
    },
    #[serde(rename = "state_changed")]
    StateChanged {
        pool_id: PoolId,
        from: PoolStatus,
        to: PoolStatus,
    },
    #[serde(rename = "settled")]
    Settled { settlement: Settlement },
    #[serde(rename = "draw_failed")]
    DrawFailed { pool_id: PoolId, reason: String },
    /// Results have been on display long enough; the UI may navigate away
    #[serde(rename = "result_window_closed")]
    ResultWindowClosed { pool_id: PoolId },
}

impl PoolEvent {
    pub fn pool_id(&self) -> PoolId {
        match self {
            PoolEvent::Tick { pool_id, .. }
            | PoolEvent::StakeJoined { pool_id, .. }
            | PoolEvent::StateChanged { pool_id, .. }
            | PoolEvent::DrawFailed { pool_id, .. }
            | PoolEvent::ResultWindowClosed { pool_id } => *pool_id,
            PoolEvent::Settled { settlement } => settlement.pool_id,
        }
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Fan-out channel for pool events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PoolEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.tx.subscribe()
    }

    /// Publish an event; returns how many subscribers saw it
    pub fn emit(&self, event: PoolEvent) -> usize {
        match self.tx.send(event) {
            Ok(n) => n,
            Err(e) => {
                debug!("No subscribers for pool event {:?}", e.0);
                0
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Invoke `callback` for every event until the bus is dropped
    pub fn on_event<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: Fn(&PoolEvent) + Send + 'static,
    {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => callback(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Event subscriber lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1000)
    }
}
