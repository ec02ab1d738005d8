//! # Node Runtime
//!
//! Owns the master peer book task, the worker peer sync services and the
//! block pipeline (decode, cache, store).
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Spawn the master peer book task
//! 3. Create one `PeerSyncService` per worker, each talking to the master
//!    over its own `ChannelOracle`
//! 4. Write the genesis header if the store is empty
//! 5. Warm up the header cache

use std::sync::Arc;

use anyhow::{Context, Result};
use kc_02_peer_sync::{spawn_master, ChannelOracle, InMemoryPeerBook, PeerSyncService};
use kc_03_header_cache::{HeaderCacheApi, HeaderCacheService, InMemoryHeaderStore};
use kc_04_block_serde::{decode_block, Block};
use shared_types::BlockHeader;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::NodeConfig;
use crate::genesis::genesis_block;

pub type HeaderCache = HeaderCacheService<InMemoryHeaderStore>;

pub struct NodeRuntime {
    config: NodeConfig,
    master_book: Arc<InMemoryPeerBook>,
    master_task: JoinHandle<()>,
    workers: Vec<Arc<PeerSyncService>>,
    store: Arc<InMemoryHeaderStore>,
    header_cache: Arc<HeaderCache>,
}

impl NodeRuntime {
    /// Start a node over an empty store.
    pub async fn start(config: NodeConfig) -> Result<Self> {
        Self::start_with_store(config, Arc::new(InMemoryHeaderStore::new())).await
    }

    /// Start a node over an existing header store.
    pub async fn start_with_store(
        config: NodeConfig,
        store: Arc<InMemoryHeaderStore>,
    ) -> Result<Self> {
        config.validate().context("invalid node configuration")?;

        let master_book = Arc::new(InMemoryPeerBook::new(config.peer_sync.auth_key.clone()));
        let (master_tx, master_task) =
            spawn_master(master_book.clone(), config.master_channel_capacity);

        let workers = (0..config.workers)
            .map(|index| {
                let oracle = Arc::new(ChannelOracle::new(master_tx.clone()));
                PeerSyncService::new(oracle, config.worker_config(index)).map(Arc::new)
            })
            .collect::<Result<Vec<_>, _>>()
            .context("failed to create peer sync workers")?;
        // Workers hold the remaining senders; the master stops once they drop.
        drop(master_tx);

        if store.is_empty() {
            let genesis = genesis_block(config.cache.genesis_height)
                .context("failed to build genesis block")?;
            info!(
                "[node] Writing genesis block {} at height {}",
                genesis.header.short_id(),
                genesis.header.height
            );
            store.insert(genesis.header);
        }

        let header_cache = Arc::new(
            HeaderCacheService::new(store.clone(), config.cache.clone())
                .context("invalid header cache configuration")?,
        );
        let loaded = header_cache
            .initialize()
            .await
            .context("failed to warm up header cache")?;

        info!(
            "[node] Started with {} workers, {} cached headers",
            workers.len(),
            loaded
        );

        Ok(Self {
            config,
            master_book,
            master_task,
            workers,
            store,
            header_cache,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn master_book(&self) -> &Arc<InMemoryPeerBook> {
        &self.master_book
    }

    pub fn worker(&self, index: usize) -> Option<&Arc<PeerSyncService>> {
        self.workers.get(index)
    }

    pub fn workers(&self) -> &[Arc<PeerSyncService>] {
        &self.workers
    }

    pub fn header_cache(&self) -> &Arc<HeaderCache> {
        &self.header_cache
    }

    pub fn store(&self) -> &Arc<InMemoryHeaderStore> {
        &self.store
    }

    /// Accept an encoded block on top of the current tip.
    ///
    /// The header is appended to the cache first; the cache rejects blocks
    /// that do not extend its tip, and nothing is stored in that case.
    pub async fn accept_block(&self, bytes: &[u8]) -> Result<Block> {
        let block = decode_block(bytes).context("failed to decode block")?;
        self.header_cache
            .add(block.header.clone())
            .await
            .with_context(|| format!("block at height {} rejected", block.header.height))?;
        self.store.insert(block.header.clone());

        debug!(
            "[node] Accepted block {} at height {} with {} transactions",
            block.header.short_id(),
            block.header.height,
            block.payload.len()
        );
        Ok(block)
    }

    /// Drop every block above `height` from store and cache.
    pub async fn rollback_to(&self, height: u32) -> Result<BlockHeader> {
        self.header_cache
            .delete_above(height)
            .await
            .with_context(|| format!("rollback to height {height} failed"))?;
        let tip = self.header_cache.get_last().await?;
        info!("[node] Rolled back to height {}", tip.height);
        Ok(tip)
    }

    /// Stop the workers and wait for the master task to drain.
    pub async fn shutdown(self) -> Result<()> {
        info!("[node] Initiating graceful shutdown...");
        drop(self.workers);
        self.master_task
            .await
            .context("master peer book task failed")?;
        info!("[node] Shutdown complete");
        Ok(())
    }
}
