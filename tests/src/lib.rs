//! # Kestrel-Chain Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── peer_sync_flows.rs   # workers, channel transport, master peer book
//!     └── block_pipeline.rs    # codec, block serde, header cache, node runtime
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p kc-tests
//! cargo test -p kc-tests integration::block_pipeline
//! ```

pub mod integration;
