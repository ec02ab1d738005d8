//! # Driving Ports (Inbound API)

use async_trait::async_trait;

use crate::domain::{Action, PeerInfo, PeerSyncError, RejectionCode, UpdateType};

/// Peer update API exposed to the worker's connection handling.
#[async_trait]
pub trait PeerUpdateApi: Send + Sync {
    /// Register `peer` on `connection_id` locally, then on the master.
    /// The local entry is rolled back if the master call fails.
    async fn insert(&self, peer: PeerInfo, connection_id: &str) -> Result<(), PeerSyncError>;

    /// Unregister `peer` locally, then on the master. The local entry is
    /// restored if the master call fails without a code.
    async fn remove(&self, peer: PeerInfo, connection_id: &str) -> Result<(), PeerSyncError>;

    /// Fail with `code`. No local or remote effect.
    fn block(
        &self,
        code: RejectionCode,
        peer: &PeerInfo,
        connection_id: &str,
    ) -> Result<(), PeerSyncError>;

    /// Handle an `updatePeer` request sent by a connected peer.
    async fn external_update(&self, request: &serde_json::Value) -> Result<(), PeerSyncError>;

    /// Reconcile a local connection event with the master and apply the
    /// resulting action. Returns the action applied.
    async fn internal_update(
        &self,
        update_type: UpdateType,
        peer: PeerInfo,
        connection_id: &str,
    ) -> Result<Action, PeerSyncError>;
}
