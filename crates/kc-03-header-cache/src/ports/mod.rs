//! Ports Layer

pub mod inbound;
pub mod outbound;

pub use inbound::HeaderCacheApi;
pub use outbound::HeaderStore;
