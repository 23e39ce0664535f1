//! PairCache - latest converted stereo pair plus the shared presentation timestamp.
//!
//! One cache per viewer session, shared by `Arc` between its two emitters.
//! Everything is guarded by one eagerly constructed lock; the pair is swapped as a
//! whole `Arc`, so readers see either the old pair or the new one, never a mix.

use contracts::{SharedPair, StereoPair};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct CacheSlot {
    current: Option<SharedPair>,
    pts: u64,
}

/// Session-scoped stereo pair cache
#[derive(Debug, Default)]
pub struct PairCache {
    slot: Mutex<CacheSlot>,
}

impl PairCache {
    /// Create an empty cache (pts = 0, never populated)
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive lock
    ///
    /// Hold the guard only for fetch-convert-store or a read; never across the
    /// cadence sleep.
    pub async fn lock(&self) -> PairCacheGuard<'_> {
        PairCacheGuard {
            slot: self.slot.lock().await,
        }
    }

    /// Current pair, or `None` if the leader has not produced one yet
    pub async fn read(&self) -> Option<SharedPair> {
        self.lock().await.read()
    }

    /// Shared presentation timestamp
    pub async fn pts(&self) -> u64 {
        self.lock().await.pts()
    }
}

/// Exclusive access to a `PairCache`
pub struct PairCacheGuard<'a> {
    slot: MutexGuard<'a, CacheSlot>,
}

impl PairCacheGuard<'_> {
    /// Current pair, or `None` if never populated
    pub fn read(&self) -> Option<SharedPair> {
        self.slot.current.clone()
    }

    pub fn is_populated(&self) -> bool {
        self.slot.current.is_some()
    }

    /// Shared presentation timestamp (0 before the first leader cycle)
    pub fn pts(&self) -> u64 {
        self.slot.pts
    }

    /// Advance the shared timestamp by `step` and return the new value
    ///
    /// Leader only, once per capture cycle.
    pub fn advance_pts(&mut self, step: u64) -> u64 {
        self.slot.pts += step;
        self.slot.pts
    }

    /// Replace the stored pair and mark the cache populated
    ///
    /// Leader only, after invalidating the upstream single-shot cache.
    pub fn refresh(&mut self, pair: StereoPair) -> SharedPair {
        let pair = Arc::new(pair);
        self.slot.current = Some(Arc::clone(&pair));
        pair
    }
}
