//! # Driving Ports (Inbound API)

use async_trait::async_trait;
use shared_types::{BlockHeader, BlockId};

use crate::domain::CacheError;

/// Header cache API used by block processing and chain queries.
#[async_trait]
pub trait HeaderCacheApi: Send + Sync {
    /// Append a newly accepted header on top of the cached tip.
    async fn add(&self, header: BlockHeader) -> Result<(), CacheError>;

    /// Remove the cached tip with `id` (chain rollback). Returns `None` when
    /// `id` is not cached.
    async fn remove(&self, id: &BlockId) -> Result<Option<BlockHeader>, CacheError>;

    /// Headers for `ids`, from cache first and one store call for the rest.
    /// Ids found nowhere are skipped.
    async fn get_by_ids(&self, ids: &[BlockId]) -> Result<Vec<BlockHeader>, CacheError>;

    async fn get_by_id(&self, id: &BlockId) -> Result<BlockHeader, CacheError>;

    async fn get_by_height(&self, height: u32) -> Result<BlockHeader, CacheError>;

    /// Headers at `heights`, in request order. Heights found nowhere are
    /// skipped.
    async fn get_by_heights(&self, heights: &[u32]) -> Result<Vec<BlockHeader>, CacheError>;

    /// Headers with `from <= height <= to`, ascending.
    async fn get_by_height_range(&self, from: u32, to: u32)
        -> Result<Vec<BlockHeader>, CacheError>;

    /// Highest known header.
    async fn get_last(&self) -> Result<BlockHeader, CacheError>;

    /// Delete every header above `height` from store and cache.
    async fn delete_above(&self, height: u32) -> Result<(), CacheError>;
}
