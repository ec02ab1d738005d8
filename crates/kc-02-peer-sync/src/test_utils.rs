//! Test utilities for peer sync.
//!
//! `ScriptedOracle` is a `RemoteStateOracle` whose answers are set by the
//! test: which nonces the master knows, whether calls fail and with what,
//! and how long they take. Every update call is recorded.
//!
//! Enable with the `test-utils` feature flag.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{PeerInfo, UpdateType};
use crate::ports::outbound::{RemoteError, RemoteStateOracle};

#[derive(Default)]
pub struct ScriptedOracle {
    present: Mutex<HashSet<String>>,
    update_failure: Mutex<Option<RemoteError>>,
    nonce_failures: Mutex<HashMap<String, RemoteError>>,
    presence_failure: Mutex<Option<RemoteError>>,
    delay: Mutex<Option<Duration>>,
    updates: Mutex<Vec<(UpdateType, PeerInfo)>>,
    presence_queries: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oracle that already lists `nonces`.
    pub fn with_present<'a>(nonces: impl IntoIterator<Item = &'a str>) -> Self {
        let oracle = Self::new();
        oracle
            .present
            .lock()
            .extend(nonces.into_iter().map(str::to_string));
        oracle
    }

    pub fn set_present(&self, nonce: &str, present: bool) {
        let mut set = self.present.lock();
        if present {
            set.insert(nonce.to_string());
        } else {
            set.remove(nonce);
        }
    }

    pub fn is_present(&self, nonce: &str) -> bool {
        self.present.lock().contains(nonce)
    }

    /// Fail every update call with `error` until cleared.
    pub fn fail_updates_with(&self, error: RemoteError) {
        *self.update_failure.lock() = Some(error);
    }

    /// Fail update calls for `nonce` only.
    pub fn fail_updates_for(&self, nonce: &str, error: RemoteError) {
        self.nonce_failures.lock().insert(nonce.to_string(), error);
    }

    /// Fail every presence query with `error` until cleared.
    pub fn fail_presence_with(&self, error: RemoteError) {
        *self.presence_failure.lock() = Some(error);
    }

    pub fn clear_failures(&self) {
        *self.update_failure.lock() = None;
        *self.presence_failure.lock() = None;
        self.nonce_failures.lock().clear();
    }

    /// Delay every call by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Recorded update calls, including failed ones.
    pub fn updates(&self) -> Vec<(UpdateType, PeerInfo)> {
        self.updates.lock().clone()
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().len()
    }

    pub fn presence_query_count(&self) -> usize {
        self.presence_queries.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RemoteStateOracle for ScriptedOracle {
    async fn send_update_peer(
        &self,
        peer: &PeerInfo,
        update_type: UpdateType,
        _auth_key: &str,
    ) -> Result<(), RemoteError> {
        self.updates.lock().push((update_type, peer.clone()));
        self.pause().await;

        let failure = self
            .update_failure
            .lock()
            .clone()
            .or_else(|| self.nonce_failures.lock().get(&peer.nonce).cloned());
        if let Some(error) = failure {
            return Err(error);
        }
        self.set_present(&peer.nonce, update_type == UpdateType::Insert);
        Ok(())
    }

    async fn query_peer_presence(&self, nonce: &str) -> Result<bool, RemoteError> {
        self.presence_queries.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let failure = self.presence_failure.lock().clone();
        match failure {
            Some(error) => Err(error),
            None => Ok(self.is_present(nonce)),
        }
    }
}
