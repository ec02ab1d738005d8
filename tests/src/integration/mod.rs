//! Cross-subsystem integration flows.

pub mod block_pipeline;
pub mod peer_sync_flows;
