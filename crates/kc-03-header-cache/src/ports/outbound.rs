//! # Driven Ports (Outbound SPI)
//!
//! Persistent block store behind the cache. Retries, if any, belong to the
//! implementation; the cache propagates failures unchanged.

use async_trait::async_trait;
use shared_types::{BlockHeader, BlockId};

use crate::domain::StoreError;

#[async_trait]
pub trait HeaderStore: Send + Sync {
    /// Headers whose id is in `ids`. Unknown ids are skipped.
    async fn get_headers_by_ids(&self, ids: &[BlockId]) -> Result<Vec<BlockHeader>, StoreError>;

    /// Headers with `from <= height <= to`, ascending by height.
    async fn get_headers_by_height_range(
        &self,
        from: u32,
        to: u32,
    ) -> Result<Vec<BlockHeader>, StoreError>;

    /// Number of stored headers.
    async fn count(&self) -> Result<u32, StoreError>;

    /// Delete every header above `height`.
    async fn delete_with_height_greater_than(&self, height: u32) -> Result<(), StoreError>;
}
