//! Per-nonce async locks.
//!
//! Operations on the same nonce run one at a time; different nonces never
//! wait on each other. Idle entries are pruned when the last guard drops.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = Mutex<HashMap<String, Arc<AsyncMutex<()>>>>;

#[derive(Default)]
pub(crate) struct NonceLocks {
    table: Arc<LockTable>,
}

impl NonceLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn acquire(&self, nonce: &str) -> NonceGuard {
        let lock = {
            let mut table = self.table.lock();
            Arc::clone(table.entry(nonce.to_string()).or_default())
        };
        let guard = lock.lock_owned().await;
        NonceGuard {
            nonce: nonce.to_string(),
            table: Arc::clone(&self.table),
            guard: Some(guard),
        }
    }

    /// Number of nonces with a held or awaited lock.
    pub(crate) fn active(&self) -> usize {
        self.table.lock().len()
    }
}

pub(crate) struct NonceGuard {
    nonce: String,
    table: Arc<LockTable>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for NonceGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut table = self.table.lock();
        // Only the table still references the lock: nobody holds or awaits it.
        let idle = table
            .get(&self.nonce)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            table.remove(&self.nonce);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_entries_pruned_after_release() {
        let locks = NonceLocks::new();
        {
            let _a = locks.acquire("a").await;
            let _b = locks.acquire("b").await;
            assert_eq!(locks.active(), 2);
        }
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_same_nonce_is_serialized() {
        let locks = Arc::new(NonceLocks::new());
        let first = locks.acquire("n").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("n").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_different_nonces_do_not_block() {
        let locks = NonceLocks::new();
        let _a = locks.acquire("a").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("b")).await;
        assert!(b.is_ok());
    }
}
