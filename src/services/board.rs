use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::error::{AppError, AppResult, PoolError};
use crate::format::format_time_left;
use crate::models::{Pool, PoolId, PoolStatus};
use crate::services::profile::ProfileService;
use crate::services::selector::WinnerSelector;
use crate::services::session::PoolSession;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Dashboard tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardTab {
    /// Accepting stakes
    Active,
    /// Staking closed, draw pending
    Ongoing,
    Closed,
}

impl BoardTab {
    pub fn includes(&self, status: PoolStatus) -> bool {
        match self {
            BoardTab::Active => status == PoolStatus::Open,
            BoardTab::Ongoing => matches!(status, PoolStatus::StakingClosed | PoolStatus::Drawing),
            BoardTab::Closed => status == PoolStatus::Settled,
        }
    }
}

/// Listing row for a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub id: PoolId,
    pub min_entry: Decimal,
    pub status: PoolStatus,
    pub participants: usize,
    pub total_pot: Decimal,
    pub time_left: String,
}

impl PoolSummary {
    fn from_pool(pool: &Pool, now: DateTime<Utc>) -> Self {
        let time_left = match pool.status() {
            PoolStatus::Open => format_time_left(pool.remaining(now)),
            PoolStatus::StakingClosed | PoolStatus::Drawing => "In Progress".to_string(),
            PoolStatus::Settled => "Ended".to_string(),
        };

        Self {
            id: pool.id,
            min_entry: pool.min_entry,
            status: pool.status(),
            participants: pool.participant_count(),
            total_pot: pool.total_pot(),
            time_left,
        }
    }
}

/// Registry of every pool session
pub struct PoolBoard {
    sessions: RwLock<BTreeMap<PoolId, Arc<PoolSession>>>,
    clock: Arc<dyn Clock>,
    selector: Arc<Mutex<WinnerSelector>>,
    profiles: Arc<ProfileService>,
    config: SessionConfig,
}

impl PoolBoard {
    pub fn new(clock: Arc<dyn Clock>, selector: WinnerSelector, config: SessionConfig) -> Self {
        Self {
            sessions: RwLock::new(BTreeMap::new()),
            clock,
            selector: Arc::new(Mutex::new(selector)),
            profiles: Arc::new(ProfileService::new()),
            config,
        }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn profiles(&self) -> Arc<ProfileService> {
        self.profiles.clone()
    }

    /// Register a new open pool. Its countdown is not started.
    pub async fn create_pool(
        &self,
        id: PoolId,
        min_entry: Decimal,
        closes_at: DateTime<Utc>,
    ) -> AppResult<Arc<PoolSession>> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&id) {
            return Err(PoolError::DuplicatePool(id).into());
        }

        let pool = Pool::new(id, min_entry, closes_at, self.clock.now())?;
        let session = Arc::new(PoolSession::new(
            pool,
            self.clock.clone(),
            self.selector.clone(),
            self.config.clone(),
        ));

        self.spawn_recorder(&session);
        sessions.insert(id, session.clone());

        info!("Pool {} created (min entry {} FLOW, closes {})", id, min_entry, closes_at);
        Ok(session)
    }

    pub async fn get(&self, id: PoolId) -> AppResult<Arc<PoolSession>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Pool {} not found", id)))
    }

    pub async fn sessions(&self) -> Vec<Arc<PoolSession>> {
        self.sessions.read().await.values().cloned().collect()
    }

    /// Pools on a tab, newest id first
    pub async fn list(&self, tab: BoardTab) -> Vec<PoolSummary> {
        let sessions = self.sessions().await;
        let now = self.clock.now();

        let mut rows = Vec::new();
        for session in sessions.iter().rev() {
            let pool = session.snapshot().await;
            if tab.includes(pool.status()) {
                rows.push(PoolSummary::from_pool(&pool, now));
            }
        }
        rows
    }

    /// Start every pool that is still open
    pub async fn start_all(&self) -> AppResult<usize> {
        let mut started = 0;
        for session in self.sessions().await {
            if session.current_state().await != PoolStatus::Open {
                continue;
            }
            match session.start().await {
                Ok(()) => started += 1,
                Err(PoolError::AlreadyRunning) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(started)
    }

    /// Feed the settlement of `session` into the profile history.
    ///
    /// Reads the settlement watch rather than the event stream so a small
    /// event buffer cannot drop the result.
    fn spawn_recorder(&self, session: &PoolSession) {
        let mut rx = session.watch_settlement();
        let profiles = self.profiles.clone();
        let pool_id = session.id();

        tokio::spawn(async move {
            let settlement = match rx.wait_for(|s| s.is_some()).await {
                Ok(settled) => settled.clone(),
                Err(_) => {
                    debug!("Pool {} dropped before settling", pool_id);
                    return;
                }
            };
            if let Some(settlement) = settlement {
                profiles.record_settlement(&settlement).await;
            }
        });
    }
}
