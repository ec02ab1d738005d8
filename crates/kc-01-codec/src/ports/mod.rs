//! Ports Layer
//!
//! The codec is pure, so it only exposes a driving port.

pub mod inbound;

pub use inbound::CodecApi;
