//! # Domain Layer
//!
//! Pure peer-sync logic: the connection registry, the update-rules table,
//! request validation and error codes. No I/O and no async.

pub mod connection_registry;
pub mod entities;
pub mod errors;
pub mod request;
pub mod update_rules;

pub use connection_registry::ConnectionRegistry;
pub use entities::{ConnectionId, Nonce, PeerInfo, PeerState, UpdateType};
pub use errors::{codes, PeerSyncError, RejectionCode};
pub use request::{UpdatePeerRequest, MAX_NONCE_LENGTH};
pub use update_rules::{resolve, Action, Presence};
