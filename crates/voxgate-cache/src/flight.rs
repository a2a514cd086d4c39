//! Per-key single-flight guard
//!
//! Concurrent synthesis requests for the same canonical hash serialize
//! on a per-hash async mutex; the waiter re-checks the cache once the
//! leader finishes and finds the entry instead of paying for a second
//! synthesis of identical audio.

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Prune dead lock entries once the map grows past this size
const PRUNE_THRESHOLD: usize = 1024;

/// Map of in-flight canonical hashes to their locks
#[derive(Debug, Default)]
pub struct SingleFlight {
    locks: DashMap<String, Weak<Mutex<()>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one canonical hash
    ///
    /// The returned guard is held across the cache-check/synthesize/
    /// cache-write sequence; dropping it releases the hash.
    pub async fn acquire(&self, hash: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut entry = self.locks.entry(hash.to_owned()).or_insert_with(Weak::new);
            match entry.upgrade() {
                Some(existing) => existing,
                None => {
                    let fresh = Arc::new(Mutex::new(()));
                    *entry = Arc::downgrade(&fresh);
                    fresh
                }
            }
        };

        if self.locks.len() > PRUNE_THRESHOLD {
            self.locks.retain(|_, weak| weak.strong_count() > 0);
        }

        lock.lock_owned().await
    }
}
