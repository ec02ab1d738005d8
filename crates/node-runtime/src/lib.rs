//! # Node Runtime Library
//!
//! Exposes the node wiring for tests. The entry point is the `main.rs`
//! binary.
//!
//! ## Topology
//!
//! ```text
//!  socket events                         encoded blocks
//!       │                                      │
//!       ↓                                      ↓
//!  PeerSyncService (worker-0..N)        decode_block (kc-04)
//!       │  ChannelOracle                       │
//!       ↓                                      ↓
//!  master task ── InMemoryPeerBook      HeaderCacheService (kc-03)
//!                                              │
//!                                              ↓
//!                                      InMemoryHeaderStore
//! ```

pub mod config;
pub mod genesis;
pub mod runtime;

pub use config::{ConfigError, NodeConfig};
pub use genesis::genesis_block;
pub use runtime::{HeaderCache, NodeRuntime};
