//! # Driven Ports (Outbound SPI)
//!
//! The master process owns the authoritative peer list. Workers reach it
//! through this port; the transport behind it (channel, IPC, RPC) is an
//! adapter concern.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{PeerInfo, UpdateType};

/// Failure reported by the master or by the transport in front of it.
///
/// `code` is `None` when the failure is not a business rejection (channel
/// closed, timeout, crash). The service rolls local state back only for
/// those on remove.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteError {
    pub code: Option<u16>,
    pub message: String,
}

impl RemoteError {
    /// Business failure with an explicit code.
    pub fn coded(code: u16, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    /// Failure without a code.
    pub fn uncoded(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

/// Remote State Oracle (master process).
#[async_trait]
pub trait RemoteStateOracle: Send + Sync {
    /// Apply an authenticated peer update on the master.
    async fn send_update_peer(
        &self,
        peer: &PeerInfo,
        update_type: UpdateType,
        auth_key: &str,
    ) -> Result<(), RemoteError>;

    /// Whether the master lists a peer with `nonce`.
    async fn query_peer_presence(&self, nonce: &str) -> Result<bool, RemoteError>;
}
