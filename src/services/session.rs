//! Pool session state machine.
//!
//! A session owns one pool behind a lock and moves it through
//! `Open -> StakingClosed -> Drawing -> Settled`. The countdown's expiry is
//! the only way out of `Open`; everything after that runs on its own.

use crate::clock::{Clock, Countdown, TimerEvent};
use crate::config::SessionConfig;
use crate::error::PoolError;
use crate::events::{EventBus, PoolEvent};
use crate::format::ceil_secs;
use crate::models::{Pool, PoolId, PoolStatus, Settlement};
use crate::services::ledger::StakeLedger;
use crate::services::selector::WinnerSelector;
use crate::wallet::WalletSession;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error, info, warn};

/// Drives a single pool from open to settled
pub struct PoolSession {
    pool_id: PoolId,
    pool: Arc<RwLock<Pool>>,
    clock: Arc<dyn Clock>,
    selector: Arc<Mutex<WinnerSelector>>,
    events: EventBus,
    settled: Arc<watch::Sender<Option<Settlement>>>,
    config: SessionConfig,
    countdown: Mutex<Countdown>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for PoolSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolSession")
            .field("pool_id", &self.pool_id)
            .finish_non_exhaustive()
    }
}

impl PoolSession {
    pub fn new(
        pool: Pool,
        clock: Arc<dyn Clock>,
        selector: Arc<Mutex<WinnerSelector>>,
        config: SessionConfig,
    ) -> Self {
        let countdown = Countdown::new(clock.clone(), config.tick_interval());
        let events = EventBus::new(config.event_buffer);
        let (settled, _) = watch::channel(pool.settlement().cloned());

        Self {
            pool_id: pool.id,
            pool: Arc::new(RwLock::new(pool)),
            clock,
            selector,
            events,
            settled: Arc::new(settled),
            config,
            countdown: Mutex::new(countdown),
            driver: Mutex::new(None),
        }
    }

    pub fn id(&self) -> PoolId {
        self.pool_id
    }

    /// Start the countdown towards the pool's `closes_at`
    pub async fn start(&self) -> Result<(), PoolError> {
        let closes_at = {
            let pool = self.pool.read().await;
            if !pool.is_open() {
                return Err(PoolError::PoolNotOpen(self.pool_id));
            }
            pool.closes_at
        };

        let timer = self.countdown.lock().await.start_until(closes_at)?;

        let driver = Driver {
            pool_id: self.pool_id,
            pool: self.pool.clone(),
            clock: self.clock.clone(),
            selector: self.selector.clone(),
            events: self.events.clone(),
            settled: self.settled.clone(),
            analyzing_delay: self.config.analyzing_delay(),
            result_display: self.config.result_display(),
        };
        let handle = tokio::spawn(driver.run(timer));
        *self.driver.lock().await = Some(handle);

        info!("Pool {} session started", self.pool_id);
        Ok(())
    }

    /// Stop the countdown while staking is still open.
    ///
    /// Has no effect once the countdown has expired; a draw in progress
    /// always runs to completion.
    pub async fn cancel(&self) -> bool {
        self.countdown.lock().await.cancel()
    }

    /// Stake `amount` from `wallet`; returns the new pot
    pub async fn join(&self, wallet: &WalletSession, amount: Decimal) -> Result<Decimal, PoolError> {
        let mut pool = self.pool.write().await;
        let pot = StakeLedger::join(&mut pool, wallet, amount, self.clock.now())?;

        self.events.emit(PoolEvent::StakeJoined {
            pool_id: self.pool_id,
            wallet: wallet.address().to_string(),
            amount,
            total_pot: pot,
            participants: pool.participant_count(),
        });

        Ok(pot)
    }

    pub async fn current_state(&self) -> PoolStatus {
        self.pool.read().await.status()
    }

    pub async fn total_pot(&self) -> Decimal {
        StakeLedger::total_pot(&*self.pool.read().await)
    }

    pub async fn participant_count(&self) -> usize {
        StakeLedger::participant_count(&*self.pool.read().await)
    }

    pub async fn remaining(&self) -> Duration {
        self.pool.read().await.remaining(self.clock.now())
    }

    /// Consistent copy of the pool
    pub async fn snapshot(&self) -> Pool {
        self.pool.read().await.clone()
    }

    pub async fn settlement(&self) -> Result<Settlement, PoolError> {
        self.pool
            .read()
            .await
            .settlement()
            .cloned()
            .ok_or(PoolError::NotSettled(self.pool_id))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.events.subscribe()
    }

    /// Settlement feed that cannot lag: holds `None` until the draw lands.
    ///
    /// Unlike [`subscribe`](Self::subscribe) a slow reader never misses the
    /// result, whatever the event buffer size.
    pub fn watch_settlement(&self) -> watch::Receiver<Option<Settlement>> {
        self.settled.subscribe()
    }

    /// Call `callback` on every event this pool publishes
    pub fn on_state_change<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: Fn(&PoolEvent) + Send + 'static,
    {
        self.events.on_event(callback)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

impl Drop for PoolSession {
    fn drop(&mut self) {
        if let Some(handle) = self.driver.get_mut().take() {
            handle.abort();
        }
    }
}

/// Background task reacting to countdown events
struct Driver {
    pool_id: PoolId,
    pool: Arc<RwLock<Pool>>,
    clock: Arc<dyn Clock>,
    selector: Arc<Mutex<WinnerSelector>>,
    events: EventBus,
    settled: Arc<watch::Sender<Option<Settlement>>>,
    analyzing_delay: Duration,
    result_display: Duration,
}

impl Driver {
    async fn run(self, mut timer: mpsc::UnboundedReceiver<TimerEvent>) {
        while let Some(event) = timer.recv().await {
            match event {
                TimerEvent::Tick { remaining } => {
                    self.events.emit(PoolEvent::Tick {
                        pool_id: self.pool_id,
                        remaining_secs: ceil_secs(remaining),
                    });
                }
                TimerEvent::Expired => {
                    self.on_expired().await;
                    return;
                }
            }
        }
        debug!("Pool {} countdown stopped before expiry", self.pool_id);
    }

    async fn on_expired(&self) {
        if let Err(e) = self.close_staking().await {
            error!("Pool {} could not close staking: {}", self.pool_id, e);
            return;
        }

        if !self.analyzing_delay.is_zero() {
            time::sleep(self.analyzing_delay).await;
        }

        if let Err(e) = self.draw().await {
            warn!("Pool {} draw failed: {}", self.pool_id, e);
            self.events.emit(PoolEvent::DrawFailed {
                pool_id: self.pool_id,
                reason: e.to_string(),
            });
            return;
        }

        if !self.result_display.is_zero() {
            time::sleep(self.result_display).await;
        }
        self.events.emit(PoolEvent::ResultWindowClosed {
            pool_id: self.pool_id,
        });
    }

    async fn close_staking(&self) -> Result<(), PoolError> {
        let mut pool = self.pool.write().await;

        for next in [PoolStatus::StakingClosed, PoolStatus::Drawing] {
            let from = pool.status();
            pool.advance(next)?;
            info!("Pool {}: {} -> {}", self.pool_id, from, next);
            self.events.emit(PoolEvent::StateChanged {
                pool_id: self.pool_id,
                from,
                to: next,
            });
        }

        Ok(())
    }

    async fn draw(&self) -> Result<(), PoolError> {
        let mut pool = self.pool.write().await;
        let settlement = self.selector.lock().await.draw(&pool, self.clock.now())?;

        let from = pool.status();
        pool.settle(settlement.clone())?;
        self.selector.lock().await.release(self.pool_id);
        info!("Pool {}: {} -> {}", self.pool_id, from, PoolStatus::Settled);

        self.events.emit(PoolEvent::StateChanged {
            pool_id: self.pool_id,
            from,
            to: PoolStatus::Settled,
        });
        self.settled.send_replace(Some(settlement.clone()));
        self.events.emit(PoolEvent::Settled { settlement });

        Ok(())
    }
}
