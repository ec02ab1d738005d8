use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{BlockHeader, BlockId};

use crate::domain::StoreError;
use crate::ports::outbound::HeaderStore;

/// `HeaderStore` keeping headers in a height-ordered map.
///
/// Counts store calls and records every requested height range so tests
/// can tell cache hits from store fallbacks.
#[derive(Default)]
pub struct InMemoryHeaderStore {
    headers: RwLock<BTreeMap<u32, BlockHeader>>,
    calls: AtomicUsize,
    ranges: Mutex<Vec<(u32, u32)>>,
    failure: Mutex<Option<StoreError>>,
}

impl InMemoryHeaderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with `headers`.
    pub fn with_headers(headers: impl IntoIterator<Item = BlockHeader>) -> Self {
        let store = Self::new();
        store.insert_all(headers);
        store
    }

    pub fn insert(&self, header: BlockHeader) {
        self.headers.write().insert(header.height, header);
    }

    pub fn insert_all(&self, headers: impl IntoIterator<Item = BlockHeader>) {
        let mut map = self.headers.write();
        for header in headers {
            map.insert(header.height, header);
        }
    }

    pub fn len(&self) -> usize {
        self.headers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.read().is_empty()
    }

    /// Number of `HeaderStore` calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every `(from, to)` passed to `get_headers_by_height_range`.
    pub fn requested_ranges(&self) -> Vec<(u32, u32)> {
        self.ranges.lock().clone()
    }

    pub fn reset_counters(&self) {
        self.calls.store(0, Ordering::SeqCst);
        self.ranges.lock().clear();
    }

    /// Fail every call with `error` until `clear_failure`.
    pub fn fail_with(&self, error: StoreError) {
        *self.failure.lock() = Some(error);
    }

    pub fn clear_failure(&self) {
        *self.failure.lock() = None;
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HeaderStore for InMemoryHeaderStore {
    async fn get_headers_by_ids(&self, ids: &[BlockId]) -> Result<Vec<BlockHeader>, StoreError> {
        self.enter()?;
        let map = self.headers.read();
        Ok(map
            .values()
            .filter(|header| ids.contains(&header.id))
            .cloned()
            .collect())
    }

    async fn get_headers_by_height_range(
        &self,
        from: u32,
        to: u32,
    ) -> Result<Vec<BlockHeader>, StoreError> {
        self.enter()?;
        self.ranges.lock().push((from, to));
        if from > to {
            return Ok(Vec::new());
        }
        Ok(self.headers.read().range(from..=to).map(|(_, h)| h.clone()).collect())
    }

    async fn count(&self) -> Result<u32, StoreError> {
        self.enter()?;
        Ok(self.headers.read().len() as u32)
    }

    async fn delete_with_height_greater_than(&self, height: u32) -> Result<(), StoreError> {
        self.enter()?;
        if let Some(first_deleted) = height.checked_add(1) {
            let _deleted = self.headers.write().split_off(&first_deleted);
        }
        Ok(())
    }
}
