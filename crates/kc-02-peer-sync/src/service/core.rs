use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::config::PeerSyncConfig;
use super::locks::NonceLocks;
use crate::domain::{
    ConnectionId, ConnectionRegistry, Nonce, PeerInfo, PeerState, PeerSyncError, RejectionCode,
    UpdateType,
};
use crate::ports::outbound::{RemoteError, RemoteStateOracle};

/// Worker-side peer sync service.
///
/// Owns this worker's `ConnectionRegistry` and reconciles it with the
/// master through a `RemoteStateOracle`. Local mutations happen before the
/// remote call and are compensated when that call fails.
pub struct PeerSyncService {
    pub(crate) registry: Mutex<ConnectionRegistry>,
    pub(crate) oracle: Arc<dyn RemoteStateOracle>,
    pub(crate) locks: NonceLocks,
    pub(crate) config: PeerSyncConfig,
}

/// Registry pairings displaced by an insert, restored on rollback.
struct Displaced {
    previous_connection: Option<ConnectionId>,
    previous_nonce: Option<Nonce>,
}

impl PeerSyncService {
    pub fn new(
        oracle: Arc<dyn RemoteStateOracle>,
        config: PeerSyncConfig,
    ) -> Result<Self, PeerSyncError> {
        config.validate()?;
        Ok(Self {
            registry: Mutex::new(ConnectionRegistry::new()),
            oracle,
            locks: NonceLocks::new(),
            config,
        })
    }

    pub fn config(&self) -> &PeerSyncConfig {
        &self.config
    }

    pub fn get_nonce(&self, connection_id: &str) -> Option<Nonce> {
        self.registry
            .lock()
            .get_nonce(connection_id)
            .map(str::to_string)
    }

    pub fn get_connection_id(&self, nonce: &str) -> Option<ConnectionId> {
        self.registry
            .lock()
            .get_connection_id(nonce)
            .map(str::to_string)
    }

    /// Number of peers registered on this worker.
    pub fn registered_peers(&self) -> usize {
        self.registry.lock().len()
    }

    /// Drop the local entry for a closed socket without telling the master.
    pub fn forget_connection(&self, connection_id: &str) -> Option<Nonce> {
        let nonce = self.registry.lock().remove_connection(connection_id);
        if let Some(nonce) = &nonce {
            debug!(
                nonce = %nonce,
                connection_id,
                "[kc-02] Forgot peer after socket closed"
            );
        }
        nonce
    }

    /// Drop all local entries (worker restart).
    pub fn reset(&self) {
        self.registry.lock().clear();
    }

    pub(crate) fn check_args(peer: &PeerInfo, connection_id: &str) -> Result<(), PeerSyncError> {
        if peer.nonce.is_empty() {
            return Err(PeerSyncError::InvalidArgument(
                "peer nonce must not be empty".to_string(),
            ));
        }
        if connection_id.is_empty() {
            return Err(PeerSyncError::InvalidArgument(
                "connection id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Run a master call under the configured timeout. A timeout is an
    /// uncoded failure.
    pub(crate) async fn call_remote<T, F>(&self, call: F) -> Result<T, RemoteError>
    where
        F: Future<Output = Result<T, RemoteError>> + Send,
    {
        let timeout = self.config.remote_timeout();
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::uncoded(format!(
                "master did not answer within {} ms",
                timeout.as_millis()
            ))),
        }
    }

    /// Map a master failure onto the error taxonomy.
    pub(crate) fn classify(error: RemoteError) -> PeerSyncError {
        match error.code {
            None => PeerSyncError::Transport {
                message: error.message,
            },
            Some(code) => match RejectionCode::from_code(code) {
                Some(code) => PeerSyncError::Rejected {
                    code,
                    message: error.message,
                },
                None => PeerSyncError::Remote {
                    code,
                    message: error.message,
                },
            },
        }
    }

    /// Insert with the nonce lock already held.
    pub(crate) async fn insert_locked(
        &self,
        mut peer: PeerInfo,
        connection_id: &str,
    ) -> Result<(), PeerSyncError> {
        Self::check_args(&peer, connection_id)?;

        let displaced = {
            let mut registry = self.registry.lock();
            let displaced = Displaced {
                previous_connection: registry.get_connection_id(&peer.nonce).map(str::to_string),
                previous_nonce: registry.get_nonce(connection_id).map(str::to_string),
            };
            registry.add(&peer.nonce, connection_id)?;
            displaced
        };
        peer.state = PeerState::Connected;

        let result = self
            .call_remote(self.oracle.send_update_peer(
                &peer,
                UpdateType::Insert,
                &self.config.auth_key,
            ))
            .await;

        match result {
            Ok(()) => {
                info!(
                    nonce = %peer.nonce,
                    connection_id,
                    worker = %self.config.worker_id,
                    "[kc-02] Peer registered"
                );
                Ok(())
            }
            Err(error) => {
                self.rollback_insert(&peer.nonce, connection_id, displaced);
                warn!(
                    nonce = %peer.nonce,
                    connection_id,
                    error = %error,
                    "[kc-02] Insert failed, rolled back"
                );
                Err(Self::classify(error))
            }
        }
    }

    /// Undo a failed insert. Pairings made by other operations while the
    /// master call was in flight are left alone.
    fn rollback_insert(&self, nonce: &str, connection_id: &str, displaced: Displaced) {
        let mut registry = self.registry.lock();
        if registry.get_connection_id(nonce) == Some(connection_id) {
            // The nonce was validated before the insert.
            let _ = registry.remove(nonce);
        }
        if let Some(previous_connection) = displaced.previous_connection {
            Self::restore_if_free(&mut registry, nonce, &previous_connection);
        }
        if let Some(previous_nonce) = displaced.previous_nonce {
            if previous_nonce != nonce {
                Self::restore_if_free(&mut registry, &previous_nonce, connection_id);
            }
        }
    }

    /// Re-add `nonce -> connection_id` only when neither side has been
    /// paired again since it was taken away.
    fn restore_if_free(registry: &mut ConnectionRegistry, nonce: &str, connection_id: &str) {
        let free = registry.get_connection_id(nonce).is_none()
            && registry.get_nonce(connection_id).is_none();
        if free {
            let _ = registry.add(nonce, connection_id);
        } else {
            debug!(
                nonce,
                connection_id,
                "[kc-02] Pairing changed during remote call, not restored"
            );
        }
    }

    /// Remove with the nonce lock already held.
    pub(crate) async fn remove_locked(
        &self,
        peer: PeerInfo,
        connection_id: &str,
    ) -> Result<(), PeerSyncError> {
        Self::check_args(&peer, connection_id)?;

        let removed_connection = self.registry.lock().remove(&peer.nonce)?;

        let result = self
            .call_remote(self.oracle.send_update_peer(
                &peer,
                UpdateType::Remove,
                &self.config.auth_key,
            ))
            .await;

        match result {
            Ok(()) => {
                info!(
                    nonce = %peer.nonce,
                    connection_id,
                    worker = %self.config.worker_id,
                    "[kc-02] Peer unregistered"
                );
                Ok(())
            }
            Err(error) if error.code.is_none() => {
                if let Some(previous) = removed_connection {
                    Self::restore_if_free(&mut self.registry.lock(), &peer.nonce, &previous);
                }
                warn!(
                    nonce = %peer.nonce,
                    error = %error,
                    "[kc-02] Remove failed without a code, restored locally"
                );
                Err(Self::classify(error))
            }
            Err(error) => {
                debug!(
                    nonce = %peer.nonce,
                    error = ?error,
                    "[kc-02] Master rejected removal"
                );
                Err(Self::classify(error))
            }
        }
    }
}
