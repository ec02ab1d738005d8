//! # Peer Sync (kc-02)
//!
//! Keeps each worker's view of connected peers consistent with the master
//! process that owns the authoritative peer list.
//!
//! Workers accept sockets and record `connection id <-> nonce` pairs in a
//! local `ConnectionRegistry`. On every connect/disconnect the worker asks
//! the master whether it knows the peer, resolves the update through a
//! fixed decision table, applies the result locally and forwards it to the
//! master. There is no two-phase commit: when the master call fails the
//! local change is compensated before the error is returned.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Inverse Maps | Registry maps are exact inverses after every call |
//! | 2 | Total Rules | Every (update, local, remote) combination has one action |
//! | 3 | Insert Rollback | A failed master insert leaves no local entry |
//! | 4 | Remove Restore | An uncoded master failure on remove restores the local entry |
//! | 5 | Nonce Serialization | Operations on the same nonce never interleave |
//!
//! ## Error Codes
//!
//! | Code | Name |
//! |------|------|
//! | 4000 | TRANSPORT |
//! | 4001 | VALIDATION |
//! | 4002 | INVALID_ARGUMENT |
//! | 4100 | INVALID_PEER |
//! | 4101 | DIFFERENT_CONN_ID |
//! | 4102 | ALREADY_ADDED |
//! | 4103 | ALREADY_REMOVED |
//! | 4104 | UNAUTHORIZED |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Registry, update rules, request validation, errors
//! - `ports/` - `PeerUpdateApi` (inbound), `RemoteStateOracle` (outbound)
//! - `service/` - `PeerSyncService`, configuration, per-nonce locks
//! - `adapters/` - In-memory master peer book, channel transport
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use kc_02_peer_sync::{
//!     InMemoryPeerBook, PeerInfo, PeerSyncConfig, PeerSyncService, PeerUpdateApi, UpdateType,
//! };
//!
//! # tokio_test::block_on(async {
//! let config = PeerSyncConfig::for_testing();
//! let master = Arc::new(InMemoryPeerBook::new(config.auth_key.clone()));
//! let worker = PeerSyncService::new(master.clone(), config).unwrap();
//!
//! worker
//!     .internal_update(UpdateType::Insert, PeerInfo::new("nonce-A"), "conn-1")
//!     .await
//!     .unwrap();
//!
//! assert_eq!(worker.get_nonce("conn-1").as_deref(), Some("nonce-A"));
//! assert!(master.get("nonce-A").is_some());
//! # });
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{spawn_master, ChannelOracle, InMemoryPeerBook, OracleRequest};
pub use domain::{
    codes, resolve, Action, ConnectionId, ConnectionRegistry, Nonce, PeerInfo, PeerState,
    PeerSyncError, Presence, RejectionCode, UpdatePeerRequest, UpdateType,
};
pub use ports::{PeerUpdateApi, RemoteError, RemoteStateOracle};
pub use service::{PeerSyncConfig, PeerSyncService, DEFAULT_AUTH_KEY};
