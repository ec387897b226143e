//! InOrOut pool simulator
//!
//! Seeds the dashboard pools, connects a mock wallet, stakes it into the
//! first pool and runs every pool through countdown, draw and payout.

use inorout_backend::clock::{Clock, SystemClock};
use inorout_backend::config::AppConfig;
use inorout_backend::error::{AppError, AppResult};
use inorout_backend::events::PoolEvent;
use inorout_backend::format::{format_address, format_amount};
use inorout_backend::seed::{seed_board, SEED_POOLS};
use inorout_backend::services::{BoardTab, PoolBoard, QuickStake, WinnerSelector};
use inorout_backend::wallet::MockWalletConnector;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("inorout_backend={}", config.log_level).into()
            }),
        )
        .init();

    info!("InOrOut pool simulator starting");
    info!("Environment: {}", config.environment);
    info!("Network: {} ({})", config.network, config.network.config().access_node);
    info!(
        "Tick {:?}, analyzing {:?}, results shown {:?}",
        config.session.tick_interval(),
        config.session.analyzing_delay(),
        config.session.result_display()
    );

    // =========================================================================
    // BOARD SETUP
    // =========================================================================
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let selector = match config.draw_seed {
        Some(seed) => {
            info!("Draws are reproducible (seed {})", seed);
            WinnerSelector::seeded(seed)
        }
        None => WinnerSelector::from_entropy(),
    };

    let board = PoolBoard::new(clock.clone(), selector, config.session.clone());
    let sessions = seed_board(&board, clock.now()).await?;
    info!("✓ Seeded {} pools", sessions.len());

    for row in board.list(BoardTab::Active).await {
        info!(
            "  #{} min {} FLOW, {} players, pot {} FLOW, closes in {}",
            row.id, row.min_entry, row.participants, row.total_pot, row.time_left
        );
    }

    // =========================================================================
    // WALLET
    // =========================================================================
    let mut connector = MockWalletConnector::new();
    let wallet = connector.connect().await;
    info!(
        "✓ Wallet {} connected with {} FLOW",
        format_address(wallet.address(), true),
        format_amount(wallet.available_balance(), 4)
    );

    let target = board.get(SEED_POOLS[0].id).await?;
    let pool = target.snapshot().await;
    let amount = QuickStake::Quarter
        .amount(pool.min_entry, wallet.available_balance())
        .max(pool.min_entry);

    match target.join(&wallet, amount).await {
        Ok(pot) => info!(
            "✓ Joined pool #{} with {} FLOW; pot is now {} FLOW",
            target.id(),
            format_amount(amount, 2),
            format_amount(pot, 2)
        ),
        Err(e) => warn!("Could not join pool #{}: {}", target.id(), e),
    }

    // =========================================================================
    // RUN
    // =========================================================================
    let mut waiters = Vec::with_capacity(sessions.len());
    for session in &sessions {
        session.on_state_change(|event| {
            if matches!(event, PoolEvent::Tick { .. }) {
                return;
            }
            match event.to_json() {
                Ok(json) => debug!("{}", json),
                Err(e) => warn!("Could not serialize pool event: {}", e),
            }
        });

        let mut rx = session.subscribe();
        waiters.push(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(PoolEvent::ResultWindowClosed { .. }) | Ok(PoolEvent::DrawFailed { .. }) => break,
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
            }
        }));
    }

    let started = board.start_all().await?;
    info!("✓ {} countdowns running. Press Ctrl+C to stop", started);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping countdowns...");
            for session in &sessions {
                session.cancel().await;
            }
        }
        _ = async {
            for waiter in waiters {
                if let Err(e) = waiter.await {
                    error!("Pool watcher failed: {}", e);
                }
            }
        } => {
            info!("All pools finished");
        }
    }

    // =========================================================================
    // RESULTS
    // =========================================================================
    for session in &sessions {
        match session.settlement().await {
            Ok(settlement) => {
                let you = if settlement.is_winner(wallet.address()) { " (you)" } else { "" };
                info!(
                    "Pool #{}: {}{} wins {} FLOW - {}",
                    settlement.pool_id,
                    format_address(&settlement.winner.wallet_address, true),
                    you,
                    format_amount(settlement.payout, 2),
                    config.network.account_url(&settlement.winner.wallet_address)
                );
                if let Some(credit) = settlement.consolation_for(wallet.address()) {
                    info!(
                        "Pool #{}: you receive {} {}",
                        settlement.pool_id,
                        format_amount(credit.amount, 2),
                        credit.currency.symbol()
                    );
                }
            }
            Err(e) => warn!("Pool #{}: {}", session.id(), e),
        }
    }

    let stats = board.profiles().stats(wallet.address()).await;
    info!(
        "Profile: {} games, {} wins ({}%), {} FLOW won, {} IOO earned",
        stats.total_games,
        stats.total_wins,
        stats.win_rate,
        format_amount(stats.total_flow_won, 2),
        format_amount(stats.total_ioo_earned, 2)
    );

    info!("InOrOut pool simulator shutdown complete");
    Ok(())
}
