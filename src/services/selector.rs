//! Winner draw.
//!
//! Every participant has the same chance regardless of stake size. The
//! randomness is injected so draws can be replayed from a seed.

use crate::error::PoolError;
use crate::models::{Pool, PoolId, PoolStatus, Settlement};
use chrono::{DateTime, Utc};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use tracing::info;

/// Uniform index picker
pub trait RandomSource: Send {
    /// Index in `0..len`; `len` is never zero
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Adapts any `rand` generator into a [`RandomSource`]
pub struct RngSource<R>(R);

impl<R: RngCore + Send> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngSource<ChaCha8Rng> {
    /// Reproducible source: the same seed yields the same sequence of draws
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }
}

impl<R: RngCore + Send> RandomSource for RngSource<R> {
    fn pick_index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

/// Draws one winner per pool
pub struct WinnerSelector {
    random: Box<dyn RandomSource>,
    /// Drawn pools whose settlement is not stored on the pool yet
    drawn: HashSet<PoolId>,
}

impl WinnerSelector {
    pub fn new(random: Box<dyn RandomSource>) -> Self {
        Self {
            random,
            drawn: HashSet::new(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Box::new(RngSource::seeded(seed)))
    }

    pub fn from_entropy() -> Self {
        Self::new(Box::new(RngSource::from_entropy()))
    }

    /// Pick the winner of a pool that is in `Drawing`.
    ///
    /// The pool itself is not modified; the caller stores the settlement.
    pub fn draw(&mut self, pool: &Pool, now: DateTime<Utc>) -> Result<Settlement, PoolError> {
        if self.drawn.contains(&pool.id) || pool.settlement().is_some() {
            return Err(PoolError::AlreadyDrawn(pool.id));
        }
        if pool.status() != PoolStatus::Drawing {
            return Err(PoolError::DrawNotReady {
                pool_id: pool.id,
                status: pool.status(),
            });
        }

        let roster = pool.participants();
        if roster.is_empty() {
            return Err(PoolError::EmptyRoster(pool.id));
        }

        let index = self.random.pick_index(roster.len()) % roster.len();
        let settlement = Settlement::from_roster(pool.id, roster, index, now)
            .ok_or(PoolError::EmptyRoster(pool.id))?;

        self.drawn.insert(pool.id);
        info!(
            "Pool {} drawn: winner {} takes {} FLOW from {} players",
            pool.id,
            settlement.winner.wallet_address,
            settlement.payout,
            roster.len()
        );

        Ok(settlement)
    }

    pub fn has_drawn(&self, pool_id: PoolId) -> bool {
        self.drawn.contains(&pool_id)
    }

    /// Stop tracking `pool_id` once the pool holds its settlement; from then
    /// on the pool itself rejects another draw.
    pub fn release(&mut self, pool_id: PoolId) -> bool {
        self.drawn.remove(&pool_id)
    }

    /// Pools drawn but not yet released
    pub fn pending(&self) -> usize {
        self.drawn.len()
    }
}
