use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub redis_url: Option<String>,
    #[serde(default)]
    pub seed_sample_flights: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub retry_attempts: u32,
    pub retry_initial_backoff_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { retry_attempts: 2, retry_initial_backoff_ms: 200 }
    }
}

impl SearchConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_initial_backoff_ms)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PaymentConfig {
    pub simulated_delay_ms: u64,
}

impl PaymentConfig {
    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }
}

/// Lifetime of server-hosted booking flows.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub idle_ttl_secs: u64,
    pub confirmed_ttl_secs: u64,
    pub max_per_owner: usize,
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { idle_ttl_secs: 1800, confirmed_ttl_secs: 300, max_per_owner: 5, sweep_interval_secs: 60 }
    }
}

impl SessionConfig {
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }

    pub fn confirmed_ttl(&self) -> Duration {
        Duration::from_secs(self.confirmed_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `GALAXY__SERVER__PORT=8080` sets `server.port`
            .add_source(config::Environment::with_prefix("GALAXY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
