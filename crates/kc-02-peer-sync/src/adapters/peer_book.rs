//! In-memory master peer book.
//!
//! Authoritative peer list held by the master process. Implements
//! `RemoteStateOracle` directly so it can serve workers in-process or behind
//! the channel transport.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::{codes, Nonce, PeerInfo, PeerState, RejectionCode, UpdateType};
use crate::ports::outbound::{RemoteError, RemoteStateOracle};

pub struct InMemoryPeerBook {
    auth_key: String,
    peers: RwLock<HashMap<Nonce, PeerInfo>>,
}

impl InMemoryPeerBook {
    pub fn new(auth_key: impl Into<String>) -> Self {
        Self {
            auth_key: auth_key.into(),
            peers: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, nonce: &str) -> Option<PeerInfo> {
        self.peers.read().get(nonce).cloned()
    }

    /// Peers matching `nonce`. Empty when unknown.
    pub fn find_by_nonce(&self, nonce: &str) -> Vec<PeerInfo> {
        self.peers
            .read()
            .values()
            .filter(|p| p.nonce == nonce)
            .cloned()
            .collect()
    }

    /// All peers, ordered by nonce.
    pub fn list(&self) -> Vec<PeerInfo> {
        let mut peers: Vec<_> = self.peers.read().values().cloned().collect();
        peers.sort_by(|a, b| a.nonce.cmp(&b.nonce));
        peers
    }

    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }
}

#[async_trait]
impl RemoteStateOracle for InMemoryPeerBook {
    async fn send_update_peer(
        &self,
        peer: &PeerInfo,
        update_type: UpdateType,
        auth_key: &str,
    ) -> Result<(), RemoteError> {
        if auth_key != self.auth_key {
            return Err(RemoteError::coded(
                codes::UNAUTHORIZED,
                RejectionCode::Unauthorized.message(),
            ));
        }
        if peer.nonce.is_empty() {
            return Err(RemoteError::coded(
                codes::INVALID_PEER,
                RejectionCode::InvalidPeer.message(),
            ));
        }

        let mut peers = self.peers.write();
        match update_type {
            UpdateType::Insert => {
                let mut record = peer.clone();
                record.state = PeerState::Connected;
                if peers.insert(record.nonce.clone(), record).is_none() {
                    info!(nonce = %peer.nonce, "[kc-02] Master added peer");
                }
                Ok(())
            }
            UpdateType::Remove => match peers.remove(&peer.nonce) {
                Some(_) => {
                    info!(nonce = %peer.nonce, "[kc-02] Master removed peer");
                    Ok(())
                }
                None => {
                    debug!(nonce = %peer.nonce, "[kc-02] Master has no such peer to remove");
                    Err(RemoteError::coded(
                        codes::ALREADY_REMOVED,
                        RejectionCode::AlreadyRemoved.message(),
                    ))
                }
            },
        }
    }

    async fn query_peer_presence(&self, nonce: &str) -> Result<bool, RemoteError> {
        Ok(!self.find_by_nonce(nonce).is_empty())
    }
}
