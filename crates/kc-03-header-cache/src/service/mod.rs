//! # Header Cache Service
//!
//! Bounded window of the newest headers in front of a `HeaderStore`.
//!
//! Reads take the window lock shared and fall back to the store for
//! anything outside the window. Reads never backfill the window. Writes
//! (`add`, `remove`, `delete_above`, `initialize`) take it exclusively,
//! including across the refill fetch, so no reader observes a half-refilled
//! window.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{BlockHeader, BlockId};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::CacheConfig;
use crate::domain::{CacheError, HeaderWindow};
use crate::ports::inbound::HeaderCacheApi;
use crate::ports::outbound::HeaderStore;


pub struct HeaderCacheService<S: HeaderStore> {
    window: RwLock<HeaderWindow>,
    store: Arc<S>,
    config: CacheConfig,
}

impl<S: HeaderStore> HeaderCacheService<S> {
    /// Create an empty cache. Call `initialize` to warm it up.
    pub fn new(store: Arc<S>, config: CacheConfig) -> Result<Self, CacheError> {
        config.validate()?;
        Ok(Self {
            window: RwLock::new(HeaderWindow::new()),
            store,
            config,
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Number of cached headers.
    pub async fn len(&self) -> usize {
        self.window.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.window.read().await.is_empty()
    }

    /// Lowest and highest cached heights.
    pub async fn cached_range(&self) -> Option<(u32, u32)> {
        let window = self.window.read().await;
        window.lowest_height().zip(window.highest_height())
    }

    /// Load the newest `max_cached_items` headers from the store, replacing
    /// whatever is cached. Returns the number of headers loaded.
    pub async fn initialize(&self) -> Result<usize, CacheError> {
        let mut window = self.window.write().await;

        let count = self.store.count().await?;
        if count == 0 {
            window.replace(Vec::new())?;
            info!("[kc-03] Store is empty, header cache starts cold");
            return Ok(0);
        }

        let last = self.config.genesis_height.saturating_add(count - 1);
        let from = last
            .saturating_sub(capacity_u32(self.config.max_cached_items) - 1)
            .max(self.config.genesis_height);
        let headers = self.store.get_headers_by_height_range(from, last).await?;
        let loaded = headers.len();
        window.replace(headers).inspect_err(|e| {
            error!(error = %e, "[kc-03] Store returned a broken chain on warm-up");
        })?;

        info!(
            loaded,
            from,
            to = last,
            "[kc-03] Header cache warmed up"
        );
        Ok(loaded)
    }

    /// Refill from the store below the lowest cached height when the window
    /// holds fewer than `min_cached_items`. An empty window uses
    /// `fallback_lowest` as its lowest height.
    async fn refill(&self, window: &mut HeaderWindow, fallback_lowest: u32) -> Result<(), CacheError> {
        let len = window.len();
        if len >= self.config.min_cached_items {
            return Ok(());
        }
        let lowest = window.lowest_height().unwrap_or(fallback_lowest);
        if lowest <= self.config.genesis_height {
            debug!("[kc-03] Cache reaches genesis, nothing to refill");
            return Ok(());
        }

        let missing = capacity_u32(self.config.max_cached_items - len);
        let from = lowest
            .saturating_sub(missing)
            .max(self.config.genesis_height);
        let to = lowest - 1;

        let headers = self.store.get_headers_by_height_range(from, to).await?;
        if headers.is_empty() {
            warn!(from, to, "[kc-03] Refill returned nothing from store");
            return Ok(());
        }

        let fetched = headers.len();
        let result = if window.is_empty() {
            match headers.last() {
                Some(last) if last.height == to => window.replace(headers),
                _ => Err(CacheError::InvariantViolation(format!(
                    "refill of {}..={} does not end at height {}",
                    from, to, to
                ))),
            }
        } else {
            window.prepend(headers)
        };
        result.inspect_err(|e| error!(from, to, error = %e, "[kc-03] Refill rejected"))?;

        debug!(
            fetched,
            from,
            to,
            cached = window.len(),
            "[kc-03] Refilled headers"
        );
        Ok(())
    }

    async fn fetch_height(&self, height: u32) -> Result<Option<BlockHeader>, CacheError> {
        let mut headers = self
            .store
            .get_headers_by_height_range(height, height)
            .await?;
        Ok(headers.pop().filter(|h| h.height == height))
    }
}

/// Window sizes fit in `u32` heights. Larger values saturate.
fn capacity_u32(items: usize) -> u32 {
    u32::try_from(items).unwrap_or(u32::MAX)
}

#[async_trait]
impl<S: HeaderStore> HeaderCacheApi for HeaderCacheService<S> {
    async fn add(&self, header: BlockHeader) -> Result<(), CacheError> {
        let mut window = self.window.write().await;
        let height = header.height;

        if let Err(e) = window.push(header) {
            error!(height, error = %e, "[kc-03] Rejected header");
            return Err(e);
        }

        if window.len() > self.config.max_cached_items {
            let evicted = window.evict_to(self.config.min_cached_items);
            debug!(
                evicted,
                lowest = ?window.lowest_height(),
                "[kc-03] Evicted headers"
            );
        }
        Ok(())
    }

    async fn remove(&self, id: &BlockId) -> Result<Option<BlockHeader>, CacheError> {
        let mut window = self.window.write().await;

        let Some(cached) = window.get_by_id(id) else {
            return Ok(None);
        };
        if window.tip().map(|tip| tip.id) != Some(*id) {
            let err = CacheError::InvariantViolation(format!(
                "header {} at height {} is not the cached tip",
                cached.short_id(),
                cached.height
            ));
            error!("[kc-03] {}", err);
            return Err(err);
        }

        let Some(removed) = window.pop_tip() else {
            return Ok(None);
        };
        debug!(
            id = %removed.short_id(),
            height = removed.height,
            "[kc-03] Removed tip"
        );

        // The tip is already gone, so a failed refill only leaves the
        // window short; the next removal retries it.
        if let Err(e) = self.refill(&mut window, removed.height).await {
            error!(
                height = removed.height,
                cached = window.len(),
                error = %e,
                "[kc-03] Refill after tip removal failed"
            );
        }
        Ok(Some(removed))
    }

    async fn get_by_ids(&self, ids: &[BlockId]) -> Result<Vec<BlockHeader>, CacheError> {
        let window = self.window.read().await;

        let mut found: HashMap<BlockId, BlockHeader> = HashMap::with_capacity(ids.len());
        let mut missing = Vec::new();
        for id in ids {
            match window.get_by_id(id) {
                Some(header) => {
                    found.insert(*id, header.clone());
                }
                None if !missing.contains(id) => missing.push(*id),
                None => {}
            }
        }

        if !missing.is_empty() {
            for header in self.store.get_headers_by_ids(&missing).await? {
                found.insert(header.id, header);
            }
        }

        Ok(ids.iter().filter_map(|id| found.get(id).cloned()).collect())
    }

    async fn get_by_id(&self, id: &BlockId) -> Result<BlockHeader, CacheError> {
        self.get_by_ids(std::slice::from_ref(id))
            .await?
            .pop()
            .ok_or_else(|| CacheError::IdNotFound {
                id: hex::encode(id),
            })
    }

    async fn get_by_height(&self, height: u32) -> Result<BlockHeader, CacheError> {
        let window = self.window.read().await;
        if let Some(header) = window.get_by_height(height) {
            return Ok(header.clone());
        }
        self.fetch_height(height)
            .await?
            .ok_or(CacheError::HeightNotFound { height })
    }

    async fn get_by_heights(&self, heights: &[u32]) -> Result<Vec<BlockHeader>, CacheError> {
        let window = self.window.read().await;
        let mut headers = Vec::with_capacity(heights.len());
        for &height in heights {
            match window.get_by_height(height) {
                Some(header) => headers.push(header.clone()),
                None => {
                    if let Some(header) = self.fetch_height(height).await? {
                        headers.push(header);
                    }
                }
            }
        }
        Ok(headers)
    }

    async fn get_by_height_range(
        &self,
        from: u32,
        to: u32,
    ) -> Result<Vec<BlockHeader>, CacheError> {
        if from > to {
            return Ok(Vec::new());
        }
        let window = self.window.read().await;
        if let Some(headers) = window.range(from, to) {
            return Ok(headers);
        }
        Ok(self.store.get_headers_by_height_range(from, to).await?)
    }

    async fn get_last(&self) -> Result<BlockHeader, CacheError> {
        let window = self.window.read().await;
        if let Some(tip) = window.tip() {
            return Ok(tip.clone());
        }

        let count = self.store.count().await?;
        if count == 0 {
            return Err(CacheError::EmptyChain);
        }
        let last = self.config.genesis_height.saturating_add(count - 1);
        self.fetch_height(last)
            .await?
            .ok_or(CacheError::HeightNotFound { height: last })
    }

    async fn delete_above(&self, height: u32) -> Result<(), CacheError> {
        let mut window = self.window.write().await;

        self.store.delete_with_height_greater_than(height).await?;
        let dropped = window.truncate_above(height);
        if dropped > 0 {
            info!(dropped, height, "[kc-03] Dropped cached headers above height");
        }

        self.refill(&mut window, height.saturating_add(1)).await
    }
}
