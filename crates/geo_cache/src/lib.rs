//! Location-bucketed result cache.
//!
//! Results are keyed by lower-cased mood plus coordinates rounded to three
//! decimals (roughly 100 m), so repeated searches from about the same spot
//! reuse one slot instead of calling the provider again. Entries expire
//! after one hour and are dropped lazily when read.
//!
//! Every operation is fail-open: storage errors are logged and turn into a
//! cache miss, never into an error for the caller.

pub mod clock;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

use common::Place;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Namespace prefix for every key this cache writes.
pub const CACHE_PREFIX: &str = "moodmap_cache_v1_";

/// Entries older than this are discarded.
pub const CACHE_TTL_MS: i64 = 60 * 60 * 1000;

/// Fingerprint of a (mood, ~100 m cell) request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which the entry lives in the store.
    pub fn storage_key(&self) -> String {
        format!("{CACHE_PREFIX}{}", self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CachedLocation {
    pub lat: f64,
    pub lng: f64,
}

/// Serialized form of one cached result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Write time, epoch milliseconds.
    pub timestamp: i64,
    pub data: Vec<Place>,
    pub location: CachedLocation,
}

impl CacheEntry {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms.saturating_sub(self.timestamp) > CACHE_TTL_MS
    }
}

/// Render with exactly three decimals, rounding once from the stored value.
/// Negative zero renders as `0.000` so both sides of the meridian/equator
/// share a cell.
fn bucket(coord: f64) -> String {
    let fixed = format!("{coord:.3}");
    match fixed.strip_prefix('-') {
        Some("0.000") => "0.000".to_string(),
        _ => fixed,
    }
}

/// Derive the fingerprint for a request: lower-cased mood, then both
/// coordinates bucketed to three decimals.
pub fn key(mood: &str, lat: f64, lng: f64) -> CacheKey {
    let mood = mood.to_lowercase();
    CacheKey(format!("{}_{}_{}", mood, bucket(lat), bucket(lng)))
}

/// Stateless accessor over a [`KeyValueStore`]; the store owns the entries.
#[derive(Debug)]
pub struct GeoCache<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: KeyValueStore> GeoCache<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> GeoCache<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fresh cached places for this request, if any.
    pub fn get(&self, mood: &str, lat: f64, lng: f64) -> Option<Vec<Place>> {
        let key = key(mood, lat, lng);
        let storage_key = key.storage_key();

        let raw = match self.store.read(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Cache MISS for {}", key);
                return None;
            }
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring corrupt cache entry {}: {}", key, e);
                return None;
            }
        };

        let now = self.clock.now_ms();
        if entry.is_expired(now) {
            debug!(
                "Cache EXPIRED for {} (age {}s)",
                key,
                now.saturating_sub(entry.timestamp) / 1000
            );
            if let Err(e) = self.store.delete(&storage_key) {
                warn!("Failed to evict expired cache entry {}: {}", key, e);
            }
            return None;
        }

        debug!("Cache HIT for {} ({} places)", key, entry.data.len());
        Some(entry.data)
    }

    /// Store a result set. Best effort: a rejected write is only logged.
    pub fn set(&self, mood: &str, lat: f64, lng: f64, data: &[Place]) {
        let key = key(mood, lat, lng);
        let entry = CacheEntry {
            timestamp: self.clock.now_ms(),
            data: data.to_vec(),
            location: CachedLocation { lat, lng },
        };

        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize cache entry {}: {}", key, e);
                return;
            }
        };

        match self.store.write(&key.storage_key(), &raw) {
            Ok(()) => debug!("Cache STORED for {} ({} places)", key, data.len()),
            Err(e) => warn!("Cache write skipped for {}: {}", key, e),
        }
    }

    /// Eagerly drop expired and unreadable entries. Returns how many were
    /// removed. `get` already expires lazily, so this is housekeeping only.
    pub fn prune(&self) -> usize {
        let keys = match self.store.list_keys_with_prefix(CACHE_PREFIX) {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Cache prune could not list keys: {}", e);
                return 0;
            }
        };

        let now = self.clock.now_ms();
        let mut removed = 0;
        for storage_key in keys {
            let stale = match self.store.read(&storage_key) {
                Ok(Some(raw)) => serde_json::from_str::<CacheEntry>(&raw)
                    .map(|entry| entry.is_expired(now))
                    .unwrap_or(true),
                Ok(None) => false,
                Err(e) => {
                    warn!("Cache prune could not read {}: {}", storage_key, e);
                    false
                }
            };
            if !stale {
                continue;
            }
            match self.store.delete(&storage_key) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Cache prune could not delete {}: {}", storage_key, e),
            }
        }

        if removed > 0 {
            info!("Cache prune removed {} stale entries", removed);
        }
        removed
    }
}
