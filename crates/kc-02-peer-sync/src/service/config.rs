//! # Peer Sync Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::PeerSyncError;

/// Auth key shipped for local development. Production nodes must override it.
pub const DEFAULT_AUTH_KEY: &str = "kestrel-dev-auth-key";

/// Worker-side peer sync configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSyncConfig {
    /// Shared secret attached to every master update.
    pub auth_key: String,

    /// Timeout for a single master call, in milliseconds.
    pub remote_timeout_ms: u64,

    /// Identifier of this worker, used in logs.
    pub worker_id: String,
}

impl Default for PeerSyncConfig {
    fn default() -> Self {
        Self {
            auth_key: DEFAULT_AUTH_KEY.to_string(),
            remote_timeout_ms: 10_000,
            worker_id: "worker-0".to_string(),
        }
    }
}

impl PeerSyncConfig {
    /// Short timeout so failure-path tests finish quickly.
    pub fn for_testing() -> Self {
        Self {
            auth_key: "test-auth-key".to_string(),
            remote_timeout_ms: 200,
            worker_id: "worker-test".to_string(),
        }
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), PeerSyncError> {
        if self.auth_key.is_empty() {
            return Err(PeerSyncError::InvalidArgument(
                "auth_key must not be empty".to_string(),
            ));
        }
        if self.remote_timeout_ms == 0 {
            return Err(PeerSyncError::InvalidArgument(
                "remote_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PeerSyncConfig::default();
        assert_eq!(config.auth_key, DEFAULT_AUTH_KEY);
        assert_eq!(config.remote_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = PeerSyncConfig::for_testing();
        config.remote_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = PeerSyncConfig::for_testing();
        config.auth_key.clear();
        assert!(config.validate().is_err());
    }
}
