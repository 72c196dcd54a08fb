//! Content-addressed memoization of intent classification
//!
//! Keys are the SHA-256 of the sanitized prompt. Each entry also keeps the text
//! it was computed from, so a lookup whose text differs from the stored text is
//! reported as stale and recomputed instead of being served.
//!
//! Concurrent callers may both miss and both insert the same key. Classification
//! is pure, so the second write is harmless.

mod store;

pub use store::{CachedIntent, IntentStore, MemoryStore, NoopStore};

use crate::intent::Intent;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Metrics for cache performance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    /// Key matched but the stored text did not
    pub stale: u64,
    pub writes: u64,
    /// Hits over lookups (0.0 - 1.0)
    pub hit_rate: f64,
}

impl CacheMetrics {
    fn record_hit(&mut self) {
        self.hits += 1;
        self.update_hit_rate();
    }

    fn record_miss(&mut self) {
        self.misses += 1;
        self.update_hit_rate();
    }

    fn record_stale(&mut self) {
        self.stale += 1;
        self.record_miss();
    }

    fn update_hit_rate(&mut self) {
        let total = self.hits + self.misses;
        self.hit_rate = if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        };
    }
}

impl std::fmt::Display for CacheMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Intent Cache ===")?;
        writeln!(f, "Hits: {}", self.hits)?;
        writeln!(f, "Misses: {}", self.misses)?;
        writeln!(f, "Stale: {}", self.stale)?;
        writeln!(f, "Writes: {}", self.writes)?;
        writeln!(f, "Hit rate: {:.1}%", self.hit_rate * 100.0)?;
        Ok(())
    }
}

/// Outcome of a cache lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    /// Same key, different text
    Stale,
}

/// Memoizes intent classification behind an injectable store
pub struct IntentCache {
    store: Arc<dyn IntentStore>,
    metrics: Mutex<CacheMetrics>,
}

impl IntentCache {
    pub fn new(store: Arc<dyn IntentStore>) -> Self {
        Self {
            store,
            metrics: Mutex::new(CacheMetrics::default()),
        }
    }

    /// Bounded in-memory cache
    pub fn in_memory(max_entries: usize) -> Self {
        Self::new(Arc::new(MemoryStore::new(max_entries)))
    }

    /// Cache that never stores anything
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopStore))
    }

    /// Hex-encoded SHA-256 of the text
    pub fn key_for(text: &str) -> String {
        hex::encode(Sha256::digest(text.as_bytes()))
    }

    /// Look up the intent for `text`
    pub fn lookup(&self, text: &str) -> (Option<Intent>, CacheStatus) {
        let key = Self::key_for(text);

        match self.store.get(&key) {
            Some(entry) if entry.text == text => {
                self.with_metrics(|m| m.record_hit());
                debug!(key = %&key[..12], "intent cache hit");
                (Some(entry.intent), CacheStatus::Hit)
            }
            Some(_) => {
                self.with_metrics(|m| m.record_stale());
                debug!(key = %&key[..12], "intent cache stale");
                (None, CacheStatus::Stale)
            }
            None => {
                self.with_metrics(|m| m.record_miss());
                (None, CacheStatus::Miss)
            }
        }
    }

    /// Store a computed intent
    pub fn insert(&self, text: &str, intent: Intent) {
        self.store.insert(
            Self::key_for(text),
            CachedIntent {
                text: text.to_string(),
                intent,
            },
        );
        self.with_metrics(|m| m.writes += 1);
    }

    /// Return the cached intent, computing and storing it on a miss
    pub fn get_or_classify<F>(&self, text: &str, classify: F) -> (Intent, CacheStatus)
    where
        F: FnOnce(&str) -> Intent,
    {
        let (cached, status) = self.lookup(text);
        if let Some(intent) = cached {
            return (intent, status);
        }

        let intent = classify(text);
        self.insert(text, intent);
        (intent, status)
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reset_metrics(&self) {
        *self.metrics.lock().unwrap_or_else(PoisonError::into_inner) = CacheMetrics::default();
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_metrics(&self, f: impl FnOnce(&mut CacheMetrics)) {
        let mut metrics = self.metrics.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut metrics);
    }
}

impl Default for IntentCache {
    fn default() -> Self {
        Self::in_memory(DEFAULT_MAX_ENTRIES)
    }
}
