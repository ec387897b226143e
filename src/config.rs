use crate::network::Network;
use std::env;
use std::time::Duration;

/// Pool session pacing
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tick_interval_ms: u64,
    pub analyzing_delay_secs: u64,
    pub result_display_secs: u64,
    pub event_buffer: usize,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub log_level: String,
    pub environment: String,
    pub network: Network,
    pub draw_seed: Option<u64>,
}

impl SessionConfig {
    /// Create session config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let tick_interval_ms = env::var("POOL_TICK_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1000);

        let analyzing_delay_secs = env::var("POOL_ANALYZING_DELAY_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(5);

        let result_display_secs = env::var("POOL_RESULT_DISPLAY_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(15);

        let event_buffer = env::var("POOL_EVENT_BUFFER")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(1000);

        let config = Self {
            tick_interval_ms,
            analyzing_delay_secs,
            result_display_secs,
            event_buffer,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval_ms == 0 {
            return Err("POOL_TICK_INTERVAL_MS must be greater than 0".to_string());
        }

        if self.event_buffer == 0 {
            return Err("POOL_EVENT_BUFFER must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get tick interval as Duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Pause between staking closing and the draw
    pub fn analyzing_delay(&self) -> Duration {
        Duration::from_secs(self.analyzing_delay_secs)
    }

    /// How long results stay up before the session signals it is done
    pub fn result_display(&self) -> Duration {
        Duration::from_secs(self.result_display_secs)
    }

    /// No pacing delays; handy for tests
    pub fn immediate() -> Self {
        Self {
            analyzing_delay_secs: 0,
            result_display_secs: 0,
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            analyzing_delay_secs: 5,
            result_display_secs: 15,
            event_buffer: 1000,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let session = SessionConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string());

        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string());

        let network = match env::var("FLOW_NETWORK") {
            Ok(s) => Network::from_str(&s)?,
            Err(_) => Network::Testnet,
        };

        let draw_seed = match env::var("DRAW_SEED") {
            Ok(s) => Some(
                s.parse::<u64>()
                    .map_err(|_| format!("Invalid DRAW_SEED: {}", s))?,
            ),
            Err(_) => None,
        };

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        Ok(Self {
            session,
            log_level: log_level.to_lowercase(),
            environment: environment.to_lowercase(),
            network,
            draw_seed,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            log_level: "info".to_string(),
            environment: "development".to_string(),
            network: Network::Testnet,
            draw_seed: None,
        }
    }
}
