use async_trait::async_trait;
use tracing::{debug, warn};

use super::core::PeerSyncService;
use crate::domain::{
    resolve, Action, PeerInfo, PeerState, PeerSyncError, Presence, RejectionCode, UpdatePeerRequest,
    UpdateType,
};
use crate::ports::inbound::PeerUpdateApi;

#[async_trait]
impl PeerUpdateApi for PeerSyncService {
    async fn insert(&self, peer: PeerInfo, connection_id: &str) -> Result<(), PeerSyncError> {
        let _guard = self.locks.acquire(&peer.nonce).await;
        self.insert_locked(peer, connection_id).await
    }

    async fn remove(&self, peer: PeerInfo, connection_id: &str) -> Result<(), PeerSyncError> {
        let _guard = self.locks.acquire(&peer.nonce).await;
        self.remove_locked(peer, connection_id).await
    }

    fn block(
        &self,
        code: RejectionCode,
        peer: &PeerInfo,
        connection_id: &str,
    ) -> Result<(), PeerSyncError> {
        debug!(
            nonce = %peer.nonce,
            connection_id,
            code = %code,
            "[kc-02] Blocked update"
        );
        Err(PeerSyncError::rejected(code))
    }

    async fn external_update(&self, request: &serde_json::Value) -> Result<(), PeerSyncError> {
        let UpdatePeerRequest {
            mut peer,
            socket_id,
            worker_id,
        } = UpdatePeerRequest::from_json(request)?;

        let _guard = self.locks.acquire(&peer.nonce).await;

        let registered = self.get_connection_id(&peer.nonce);
        if registered.as_deref() != Some(socket_id.as_str()) {
            warn!(
                nonce = %peer.nonce,
                socket_id = %socket_id,
                registered = ?registered,
                "[kc-02] Rejected update from a different socket"
            );
            return Err(PeerSyncError::rejected(RejectionCode::DifferentConnId));
        }

        peer.state = PeerState::Connected;
        self.call_remote(self.oracle.send_update_peer(
            &peer,
            UpdateType::Insert,
            &self.config.auth_key,
        ))
        .await
        .map_err(Self::classify)?;

        debug!(
            nonce = %peer.nonce,
            worker = %worker_id,
            "[kc-02] Forwarded update"
        );
        Ok(())
    }

    async fn internal_update(
        &self,
        update_type: UpdateType,
        peer: PeerInfo,
        connection_id: &str,
    ) -> Result<Action, PeerSyncError> {
        Self::check_args(&peer, connection_id)?;
        let _guard = self.locks.acquire(&peer.nonce).await;

        let remote_known = self
            .call_remote(self.oracle.query_peer_presence(&peer.nonce))
            .await
            .map_err(Self::classify)?;

        let presence = {
            let registry = self.registry.lock();
            Presence::new(
                registry.get_nonce(connection_id).is_some(),
                registry.get_connection_id(&peer.nonce).is_some(),
                remote_known,
            )
        };

        let action = resolve(update_type, presence);
        debug!(
            update = %update_type,
            nonce = %peer.nonce,
            connection_id,
            presence = ?presence,
            action = ?action,
            "[kc-02] Resolved peer update"
        );

        match action {
            Action::Insert => self.insert_locked(peer, connection_id).await?,
            Action::Remove => self.remove_locked(peer, connection_id).await?,
            Action::Reject(code) => self.block(code, &peer, connection_id)?,
        }
        Ok(action)
    }
}
