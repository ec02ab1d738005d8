//! # Node Configuration
//!
//! Built from `KC_*` environment variables on top of per-subsystem defaults.
//!
//! ## Security Requirements
//!
//! - `peer_sync.auth_key` MUST NOT be `DEFAULT_AUTH_KEY` in production

use std::env;

use kc_02_peer_sync::adapters::DEFAULT_CHANNEL_CAPACITY;
use kc_02_peer_sync::{PeerSyncConfig, DEFAULT_AUTH_KEY};
use kc_03_header_cache::CacheConfig;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Template for every worker. `worker_id` is assigned per worker.
    pub peer_sync: PeerSyncConfig,
    pub cache: CacheConfig,
    /// Number of worker peer sync services.
    pub workers: usize,
    /// Capacity of the worker-to-master request channel.
    pub master_channel_capacity: usize,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            peer_sync: PeerSyncConfig::default(),
            cache: CacheConfig::default(),
            workers: 2,
            master_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "SECURITY VIOLATION: peer sync auth key is the development default. \
         Set KC_AUTH_KEY."
    )]
    InsecureAuthKey,

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl NodeConfig {
    /// Configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `KC_AUTH_KEY`: master auth key (default: development key)
    /// - `KC_REMOTE_TIMEOUT_MS`: master call timeout (default: 10000)
    /// - `KC_WORKERS`: worker count (default: 2)
    /// - `KC_CHANNEL_CAPACITY`: master channel capacity (default: 256)
    /// - `KC_CACHE_MIN` / `KC_CACHE_MAX`: header cache bounds (default: 309 / 515)
    /// - `KC_GENESIS_HEIGHT`: height of the genesis block (default: 0)
    /// - `KC_LOG_LEVEL` or `RUST_LOG`: log filter (default: info)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(key) = lookup("KC_AUTH_KEY") {
            config.peer_sync.auth_key = key;
        }
        if let Some(ms) = parse(&lookup, "KC_REMOTE_TIMEOUT_MS")? {
            config.peer_sync.remote_timeout_ms = ms;
        }
        if let Some(workers) = parse(&lookup, "KC_WORKERS")? {
            config.workers = workers;
        }
        if let Some(capacity) = parse(&lookup, "KC_CHANNEL_CAPACITY")? {
            config.master_channel_capacity = capacity;
        }
        if let Some(min) = parse(&lookup, "KC_CACHE_MIN")? {
            config.cache.min_cached_items = min;
        }
        if let Some(max) = parse(&lookup, "KC_CACHE_MAX")? {
            config.cache.max_cached_items = max;
        }
        if let Some(height) = parse(&lookup, "KC_GENESIS_HEIGHT")? {
            config.cache.genesis_height = height;
        }
        if let Some(level) = lookup("KC_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Small node for tests: one worker, tiny cache, short timeouts.
    pub fn for_testing() -> Self {
        Self {
            peer_sync: PeerSyncConfig::for_testing(),
            cache: CacheConfig::for_testing(),
            workers: 1,
            master_channel_capacity: 16,
            log_level: "debug".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be positive".to_string()));
        }
        if self.master_channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "master_channel_capacity must be positive".to_string(),
            ));
        }
        self.peer_sync
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.cache
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.peer_sync.auth_key == DEFAULT_AUTH_KEY {
            return Err(ConfigError::InsecureAuthKey);
        }
        self.validate()
    }

    /// Peer sync config for worker `index`.
    pub fn worker_config(&self, index: usize) -> PeerSyncConfig {
        PeerSyncConfig {
            worker_id: format!("worker-{index}"),
            ..self.peer_sync.clone()
        }
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name, value })
        })
        .transpose()
}
