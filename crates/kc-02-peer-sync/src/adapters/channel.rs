//! # Channel Transport
//!
//! Request/response RPC between worker tasks and a master task over tokio
//! channels. Each request carries a correlation id and a one-shot reply
//! slot; the master answers requests in arrival order.
//!
//! A closed channel or a dropped reply slot surfaces as an uncoded
//! `RemoteError`, which the service treats as a transport failure.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{PeerInfo, UpdateType};
use crate::ports::outbound::{RemoteError, RemoteStateOracle};

/// Default request queue depth.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Call forwarded to the master.
#[derive(Debug, Clone)]
pub enum OracleCall {
    UpdatePeer {
        peer: PeerInfo,
        update_type: UpdateType,
        auth_key: String,
    },
    QueryPresence {
        nonce: String,
    },
}

/// Master's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleReply {
    Ack,
    Presence(bool),
}

/// Correlated request envelope.
#[derive(Debug)]
pub struct OracleRequest {
    pub correlation_id: Uuid,
    pub call: OracleCall,
    pub reply: oneshot::Sender<Result<OracleReply, RemoteError>>,
}

/// Spawn the master loop serving `book` until every sender is dropped.
pub fn spawn_master(
    book: Arc<dyn RemoteStateOracle>,
    capacity: usize,
) -> (mpsc::Sender<OracleRequest>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<OracleRequest>(capacity);
    let handle = tokio::spawn(async move {
        info!("[kc-02] Master peer book started");
        while let Some(request) = rx.recv().await {
            let OracleRequest {
                correlation_id,
                call,
                reply,
            } = request;
            let result = match call {
                OracleCall::UpdatePeer {
                    peer,
                    update_type,
                    auth_key,
                } => book
                    .send_update_peer(&peer, update_type, &auth_key)
                    .await
                    .map(|()| OracleReply::Ack),
                OracleCall::QueryPresence { nonce } => book
                    .query_peer_presence(&nonce)
                    .await
                    .map(OracleReply::Presence),
            };
            debug!(correlation_id = %correlation_id, result = ?result, "[kc-02] Master answered");
            if reply.send(result).is_err() {
                warn!(
                    correlation_id = %correlation_id,
                    "[kc-02] Worker dropped reply slot"
                );
            }
        }
        info!("[kc-02] Master peer book stopped");
    });
    (tx, handle)
}

/// Worker-side `RemoteStateOracle` backed by the master channel.
#[derive(Clone)]
pub struct ChannelOracle {
    tx: mpsc::Sender<OracleRequest>,
}

impl ChannelOracle {
    pub fn new(tx: mpsc::Sender<OracleRequest>) -> Self {
        Self { tx }
    }

    async fn request(&self, call: OracleCall) -> Result<OracleReply, RemoteError> {
        let correlation_id = Uuid::new_v4();
        let (reply, response) = oneshot::channel();
        self.tx
            .send(OracleRequest {
                correlation_id,
                call,
                reply,
            })
            .await
            .map_err(|_| RemoteError::uncoded("master channel closed"))?;
        response.await.map_err(|_| {
            RemoteError::uncoded(format!("master dropped request {correlation_id}"))
        })?
    }
}

#[async_trait]
impl RemoteStateOracle for ChannelOracle {
    async fn send_update_peer(
        &self,
        peer: &PeerInfo,
        update_type: UpdateType,
        auth_key: &str,
    ) -> Result<(), RemoteError> {
        let call = OracleCall::UpdatePeer {
            peer: peer.clone(),
            update_type,
            auth_key: auth_key.to_string(),
        };
        match self.request(call).await? {
            OracleReply::Ack => Ok(()),
            other => Err(RemoteError::uncoded(format!(
                "unexpected reply to updatePeer: {other:?}"
            ))),
        }
    }

    async fn query_peer_presence(&self, nonce: &str) -> Result<bool, RemoteError> {
        let call = OracleCall::QueryPresence {
            nonce: nonce.to_string(),
        };
        match self.request(call).await? {
            OracleReply::Presence(present) => Ok(present),
            other => Err(RemoteError::uncoded(format!(
                "unexpected reply to peer query: {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryPeerBook;
    use crate::domain::codes;

    #[tokio::test]
    async fn test_round_trip_through_master() {
        let book = Arc::new(InMemoryPeerBook::new("key"));
        let (tx, _handle) = spawn_master(book.clone(), 8);
        let oracle = ChannelOracle::new(tx);

        oracle
            .send_update_peer(&PeerInfo::new("n1"), UpdateType::Insert, "key")
            .await
            .unwrap();

        assert!(oracle.query_peer_presence("n1").await.unwrap());
        assert_eq!(book.len(), 1);
    }

    #[tokio::test]
    async fn test_master_errors_keep_their_code() {
        let book = Arc::new(InMemoryPeerBook::new("key"));
        let (tx, _handle) = spawn_master(book, 8);
        let oracle = ChannelOracle::new(tx);

        let err = oracle
            .send_update_peer(&PeerInfo::new("n1"), UpdateType::Remove, "key")
            .await
            .unwrap_err();
        assert_eq!(err.code, Some(codes::ALREADY_REMOVED));
    }

    #[tokio::test]
    async fn test_closed_channel_is_uncoded() {
        let (tx, rx) = mpsc::channel::<OracleRequest>(1);
        drop(rx);
        let oracle = ChannelOracle::new(tx);

        let err = oracle.query_peer_presence("n1").await.unwrap_err();
        assert_eq!(err.code, None);
    }

    #[tokio::test]
    async fn test_dropped_reply_is_uncoded() {
        let (tx, mut rx) = mpsc::channel::<OracleRequest>(1);
        let oracle = ChannelOracle::new(tx);

        let master = tokio::spawn(async move {
            // Receive and drop without answering.
            let _ = rx.recv().await;
        });

        let err = oracle.query_peer_presence("n1").await.unwrap_err();
        assert_eq!(err.code, None);
        assert!(err.message.contains("dropped"));
        master.await.unwrap();
    }

    #[tokio::test]
    async fn test_master_stops_when_senders_dropped() {
        let book = Arc::new(InMemoryPeerBook::new("key"));
        let (tx, handle) = spawn_master(book, 8);
        drop(tx);
        handle.await.unwrap();
    }
}
