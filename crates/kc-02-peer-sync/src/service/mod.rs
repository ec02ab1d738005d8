//! # Peer Sync Service
//!
//! Implements `PeerUpdateApi` over the connection registry, the update
//! rules and a `RemoteStateOracle`.
//!
//! ## Concurrency
//!
//! Every operation holds an async lock for the peer's nonce for its whole
//! duration, remote call included. Two operations on the same nonce never
//! interleave; operations on different nonces run freely. The registry
//! itself sits behind a synchronous mutex that is never held across an
//! `.await`.

mod api;
mod config;
mod core;
mod locks;

pub use config::{PeerSyncConfig, DEFAULT_AUTH_KEY};
pub use self::core::PeerSyncService;

#[cfg(test)]
mod tests;
