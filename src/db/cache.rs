use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Display;

use crate::models::MovieList;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    MovieList(MovieList),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::MovieList(list) => write!(f, "list:{}", list.endpoint()),
        }
    }
}

/// Source of the current time for cache expiry
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests and replay
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.write() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

struct CacheEntry<V> {
    cached_at: DateTime<Utc>,
    value: V,
}

/// In-process response cache with a fixed TTL
///
/// Callers pass the current time explicitly, so expiry is driven by whatever `Clock` the
/// owner holds. Expired entries are kept as a stale fallback until overwritten.
pub struct ResponseCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CacheEntry<V>>>,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fresh value for `key`, or `None` when missing or older than the TTL
    pub fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<V> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if now - entry.cached_at < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Last stored value for `key` regardless of age
    pub fn get_stale(&self, key: &CacheKey) -> Option<V> {
        self.entries.read().get(key).map(|e| e.value.clone())
    }

    pub fn put(&self, key: CacheKey, value: V, now: DateTime<Utc>) {
        self.entries.write().insert(
            key,
            CacheEntry {
                cached_at: now,
                value,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_cache_key_display() {
        let key = CacheKey::MovieList(MovieList::Trending);
        assert_eq!(format!("{}", key), "list:/trending/movie/week");
    }

    #[test]
    fn test_cache_miss() {
        let cache: ResponseCache<Vec<u32>> = ResponseCache::new(Duration::hours(6));
        let key = CacheKey::MovieList(MovieList::Popular);
        assert_eq!(cache.get(&key, start()), None);
        assert_eq!(cache.get_stale(&key), None);
    }

    #[test]
    fn test_fresh_hit_then_expiry() {
        let clock = ManualClock::new(start());
        let cache = ResponseCache::new(Duration::seconds(21600));
        let key = CacheKey::MovieList(MovieList::TopRated);

        cache.put(key.clone(), vec![1, 2, 3], clock.now());

        clock.advance(Duration::seconds(21599));
        assert_eq!(cache.get(&key, clock.now()), Some(vec![1, 2, 3]));

        clock.advance(Duration::seconds(1));
        assert_eq!(cache.get(&key, clock.now()), None);
        assert_eq!(cache.get_stale(&key), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_put_overwrites_and_refreshes() {
        let clock = ManualClock::new(start());
        let cache = ResponseCache::new(Duration::seconds(10));
        let key = CacheKey::MovieList(MovieList::Trending);

        cache.put(key.clone(), "old", clock.now());
        clock.advance(Duration::seconds(20));
        cache.put(key.clone(), "new", clock.now());

        assert_eq!(cache.get(&key, clock.now()), Some("new"));
    }

    #[test]
    fn test_keys_are_independent() {
        let cache = ResponseCache::new(Duration::seconds(10));
        cache.put(CacheKey::MovieList(MovieList::Trending), 1, start());
        assert_eq!(
            cache.get(&CacheKey::MovieList(MovieList::Popular), start()),
            None
        );
    }
}
