//! Clock provider and pool countdown.
//!
//! Remaining time is always recomputed from an absolute deadline, so missed
//! or late ticks never accumulate drift.

use crate::error::PoolError;
use crate::models::remaining_until;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock read straight from the system.
///
/// Keeps counting while the host is suspended, so deadlines stay honest.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall clock anchored at construction and advanced by the tokio clock.
///
/// Under a paused tokio runtime it follows virtual time. The tokio clock is
/// monotonic and stops while the host sleeps, so use [`SystemClock`]
/// outside tests.
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: DateTime<Utc>,
    started: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            started: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        saturating_add(self.origin, self.started.elapsed())
    }
}

/// `from + by`, saturating at the latest representable instant
fn saturating_add(from: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(by)
        .ok()
        .and_then(|span| from.checked_add_signed(span))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        let mut guard = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *guard = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *guard = saturating_add(*guard, by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Events produced by a running countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { remaining: Duration },
    /// Emitted exactly once, then the countdown stops
    Expired,
}

struct ActiveTimer {
    handle: JoinHandle<()>,
    cancel: Option<oneshot::Sender<()>>,
}

/// Single-shot countdown towards a deadline
pub struct Countdown {
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    active: Option<ActiveTimer>,
}

impl Countdown {
    pub fn new(clock: Arc<dyn Clock>, tick_interval: Duration) -> Self {
        Self {
            clock,
            tick_interval,
            active: None,
        }
    }

    /// Start counting down `duration` from now.
    ///
    /// A duration past the calendar's range counts towards the latest
    /// representable instant.
    pub fn start(&mut self, duration: Duration) -> Result<mpsc::UnboundedReceiver<TimerEvent>, PoolError> {
        let deadline = saturating_add(self.clock.now(), duration);
        self.start_until(deadline)
    }

    /// Start counting down to an absolute deadline.
    ///
    /// The first tick fires immediately; a deadline already in the past
    /// expires on that first tick.
    pub fn start_until(
        &mut self,
        deadline: DateTime<Utc>,
    ) -> Result<mpsc::UnboundedReceiver<TimerEvent>, PoolError> {
        if self.is_running() {
            return Err(PoolError::AlreadyRunning);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let clock = self.clock.clone();
        let tick_interval = self.tick_interval;

        info!("Countdown started, closes at {}", deadline);

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut cancel_rx => {
                        debug!("Countdown cancelled");
                        return;
                    }
                    _ = interval.tick() => {}
                }

                let remaining = remaining_until(deadline, clock.now());
                if remaining.is_zero() {
                    let _ = tx.send(TimerEvent::Expired);
                    return;
                }
                if tx.send(TimerEvent::Tick { remaining }).is_err() {
                    // Nobody listening any more
                    return;
                }
            }
        });

        self.active = Some(ActiveTimer {
            handle,
            cancel: Some(cancel_tx),
        });
        Ok(rx)
    }

    /// Stop ticking. Returns whether a countdown was still running.
    pub fn cancel(&mut self) -> bool {
        let was_running = self.is_running();
        if let Some(mut timer) = self.active.take() {
            if let Some(cancel) = timer.cancel.take() {
                let _ = cancel.send(());
            }
            timer.handle.abort();
        }
        if was_running {
            info!("Countdown cancelled before expiry");
        }
        was_running
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .map(|t| !t.handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some(timer) = self.active.take() {
            timer.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn countdown(tick_ms: u64) -> Countdown {
        Countdown::new(Arc::new(TokioClock::new()), Duration::from_millis(tick_ms))
    }

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        clock.advance(Duration::from_secs(3));
        assert_eq!(clock.now(), start + chrono::Duration::seconds(3));
    }

    #[test]
    fn test_manual_clock_saturates() {
        let clock = ManualClock::new(Utc::now());
        clock.advance(Duration::from_secs(u64::MAX));
        assert_eq!(clock.now(), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_system_clock_reads_wall_time() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
        assert!(now - before < chrono::Duration::seconds(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_follows_virtual_time() {
        let origin = Utc::now();
        let clock = TokioClock::starting_at(origin);
        time::sleep(Duration::from_secs(90)).await;
        assert_eq!(clock.now(), origin + chrono::Duration::seconds(90));
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_ticks_then_expires_once() {
        let mut timer = countdown(1000);
        let mut rx = timer.start(Duration::from_secs(2)).unwrap();

        assert_eq!(rx.recv().await, Some(TimerEvent::Tick { remaining: Duration::from_secs(2) }));
        assert_eq!(rx.recv().await, Some(TimerEvent::Tick { remaining: Duration::from_secs(1) }));
        assert_eq!(rx.recv().await, Some(TimerEvent::Expired));
        assert_eq!(rx.recv().await, None);
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_is_rejected_while_running() {
        let mut timer = countdown(1000);
        let _rx = timer.start(Duration::from_secs(5)).unwrap();
        assert_eq!(timer.start(Duration::from_secs(5)).unwrap_err(), PoolError::AlreadyRunning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_suppresses_expiry() {
        let mut timer = countdown(1000);
        let mut rx = timer.start(Duration::from_secs(3)).unwrap();
        assert!(matches!(rx.recv().await, Some(TimerEvent::Tick { .. })));

        assert!(timer.cancel());
        assert!(!timer.cancel());

        while let Some(event) = rx.recv().await {
            assert_ne!(event, TimerEvent::Expired);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_deadline_expires_immediately() {
        let clock: Arc<dyn Clock> = Arc::new(TokioClock::new());
        let mut timer = Countdown::new(clock.clone(), Duration::from_secs(1));
        let mut rx = timer
            .start_until(clock.now() - chrono::Duration::seconds(10))
            .unwrap();
        assert_eq!(rx.recv().await, Some(TimerEvent::Expired));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_expiry() {
        let mut timer = countdown(500);
        let mut rx = timer.start(Duration::from_millis(500)).unwrap();
        while rx.recv().await.is_some() {}
        // give the task a chance to finish
        tokio::task::yield_now().await;
        assert!(timer.start(Duration::from_secs(1)).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_duration_does_not_panic() {
        let mut timer = countdown(1000);
        let mut rx = timer.start(Duration::from_secs(10_000_000_000_000)).unwrap();
        match rx.recv().await {
            Some(TimerEvent::Tick { remaining }) => {
                assert!(remaining > Duration::from_secs(100 * 365 * 24 * 3600));
            }
            other => panic!("expected a tick, got {:?}", other),
        }
        assert!(timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_jump_expires_on_next_tick() {
        // wall time leaps ahead between ticks, as after a suspended host
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let mut timer = Countdown::new(clock.clone(), Duration::from_secs(1));
        let mut rx = timer.start(Duration::from_secs(60)).unwrap();
        assert_eq!(rx.recv().await, Some(TimerEvent::Tick { remaining: Duration::from_secs(60) }));

        clock.advance(Duration::from_secs(600));
        assert_eq!(rx.recv().await, Some(TimerEvent::Expired));
    }
}
