//! In-memory TTL cache.
//!
//! Maps string keys to cloneable values, each with an absolute expiry
//! instant. Expiry is lazy: a stale entry is only discovered (and dropped)
//! when it is read via [`TtlCache::get`] or [`TtlCache::has`], or swept by
//! an explicit [`TtlCache::cleanup`]. There is no background sweeper.
//!
//! Time comes from a [`Clock`] so tests can advance it deterministically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time via [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.origin + offset
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    created_at: Instant,
    /// `None` when `created_at + ttl` is not representable; never expires.
    expires_at: Option<Instant>,
}

impl<T> CacheEntry<T> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now <= at)
    }
}

/// Generic key → value store with per-entry expiry.
pub struct TtlCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> TtlCache<T> {
    /// Create a cache on the system clock.
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
            clock,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // A poisoned map is still structurally valid; keep serving it.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// `ttl` defaults to the cache's default TTL.
    pub fn set(&self, key: &str, value: T, ttl: Option<Duration>) {
        let now = self.clock.now();
        let entry = CacheEntry {
            value,
            created_at: now,
            expires_at: now.checked_add(ttl.unwrap_or(self.default_ttl)),
        };
        self.lock().insert(key.to_string(), entry);
    }

    /// Return the value for `key` if it has not expired.
    ///
    /// An expired entry is removed as a side effect.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Same liveness check as [`get`](Self::get), without cloning the value.
    pub fn has(&self, key: &str) -> bool {
        let now = self.clock.now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => true,
            Some(_) => {
                entries.remove(key);
                false
            }
            None => false,
        }
    }

    /// Creation instant of a live entry.
    pub fn created_at(&self, key: &str) -> Option<Instant> {
        let now = self.clock.now();
        self.lock()
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.created_at)
    }

    /// Remove `key`. Returns `true` if an entry (live or stale) was present.
    pub fn delete(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, including stale ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with_clock(default_ttl_ms: u64) -> (TtlCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = TtlCache::with_clock(Duration::from_millis(default_ttl_ms), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_round_trip_before_expiry() {
        let (cache, clock) = cache_with_clock(1000);
        cache.set("k", "value".to_string(), None);
        clock.advance(Duration::from_millis(999));
        assert_eq!(cache.get("k").as_deref(), Some("value"));
        assert!(cache.has("k"));
    }

    #[test]
    fn test_expires_after_ttl() {
        let (cache, clock) = cache_with_clock(60_000);
        cache.set("k", "v".to_string(), Some(Duration::from_millis(1000)));
        clock.advance(Duration::from_millis(1100));
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0, "stale entry removed on read");

        cache.set("k2", "v".to_string(), Some(Duration::from_millis(500)));
        clock.advance(Duration::from_millis(600));
        assert_eq!(cache.get("k2"), None);
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let (cache, clock) = cache_with_clock(1000);
        cache.set("k", "v".to_string(), Some(Duration::MAX));
        clock.advance(Duration::from_secs(365 * 24 * 3600));
        assert!(cache.has("k"));
        assert_eq!(cache.cleanup(), 0);

        let huge = TtlCache::with_clock(Duration::from_secs(i64::MAX as u64), clock.clone());
        huge.set("k", "v".to_string(), None);
        assert_eq!(huge.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_live_at_exact_expiry_instant() {
        let (cache, clock) = cache_with_clock(1000);
        cache.set("k", "v".to_string(), None);
        clock.advance(Duration::from_millis(1000));
        assert!(cache.get("k").is_some());
        clock.advance(Duration::from_millis(1));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_has_uses_lazy_expiry() {
        let (cache, clock) = cache_with_clock(100);
        cache.set("k", "v".to_string(), None);
        assert_eq!(cache.len(), 1);
        clock.advance(Duration::from_millis(200));
        assert!(!cache.has("k"));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_set_overwrites_and_resets_expiry() {
        let (cache, clock) = cache_with_clock(100);
        cache.set("k", "old".to_string(), None);
        clock.advance(Duration::from_millis(80));
        cache.set("k", "new".to_string(), None);
        clock.advance(Duration::from_millis(80));
        assert_eq!(cache.get("k").as_deref(), Some("new"));
    }

    #[test]
    fn test_delete_and_clear() {
        let (cache, _clock) = cache_with_clock(100);
        cache.set("a", "1".to_string(), None);
        cache.set("b", "2".to_string(), None);
        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cleanup_only_removes_stale() {
        let (cache, clock) = cache_with_clock(100);
        cache.set("short", "1".to_string(), Some(Duration::from_millis(50)));
        cache.set("long", "2".to_string(), Some(Duration::from_millis(500)));
        clock.advance(Duration::from_millis(60));

        assert_eq!(cache.cleanup(), 1);
        assert_eq!(cache.cleanup(), 0, "cleanup is idempotent");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("long").as_deref(), Some("2"));
    }

    #[test]
    fn test_created_at() {
        let (cache, clock) = cache_with_clock(100);
        let before = clock.now();
        cache.set("k", "v".to_string(), None);
        assert_eq!(cache.created_at("k"), Some(before));
        assert_eq!(cache.created_at("missing"), None);
    }
}
