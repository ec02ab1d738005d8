//! # Header Cache (kc-03)
//!
//! Keeps the newest block headers in memory, in front of the persistent
//! block store.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Contiguity | Cached heights increase by exactly one, lowest to highest |
//! | 2 | Parent Link | Each cached header extends the one below it |
//! | 3 | Bounded Size | After `add` the window holds at most `max_cached_items` |
//! | 4 | Refill | A removal leaving fewer than `min_cached_items` refills from below |
//!
//! ## Read Policy
//!
//! - Single headers and id batches: cache first, one store call for misses.
//! - Height ranges: cache only when the whole range is cached, otherwise the
//!   whole range comes from the store.
//! - Reads never add headers to the window.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - `HeaderWindow`, errors
//! - `ports/` - `HeaderCacheApi` (inbound), `HeaderStore` (outbound)
//! - `service/` - `HeaderCacheService`
//! - `adapters/` - `InMemoryHeaderStore`
//! - `config` - `CacheConfig`

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::InMemoryHeaderStore;
pub use config::CacheConfig;
pub use domain::{check_contiguous, CacheError, HeaderWindow, StoreError};
pub use ports::{HeaderCacheApi, HeaderStore};
pub use service::HeaderCacheService;
