//! # Adapters Layer (Hexagonal Architecture)
//!
//! - `InMemoryPeerBook` - master-side authoritative peer list
//! - `ChannelOracle` / `spawn_master` - worker-to-master RPC over tokio channels

mod channel;
mod peer_book;

pub use channel::{
    spawn_master, ChannelOracle, OracleCall, OracleReply, OracleRequest, DEFAULT_CHANNEL_CAPACITY,
};
pub use peer_book::InMemoryPeerBook;
