//! Ports Layer
//!
//! - Driving port (inbound): `PeerUpdateApi`, what the worker's socket layer calls
//! - Driven port (outbound): `RemoteStateOracle`, the master process

pub mod inbound;
pub mod outbound;

pub use inbound::PeerUpdateApi;
pub use outbound::{RemoteError, RemoteStateOracle};
