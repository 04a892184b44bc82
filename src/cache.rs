/*!
Bounded, time expiring memoization caches.

Every value type in this crate is interned: constructing a value that is
equal to one built recently returns the very same instance. This module
provides the [`Cache`] that does the interning, along with
[`CacheConfig`] for tuning it.

Each value kind has its own process wide cache. All of them are built
from one global configuration, which may be replaced with
[`configure_global`] before any value is constructed.

# Example

A `Cache` can also be used directly:

```
use nanotemporals::cache::{Cache, CacheConfig};

let cache = Cache::new(CacheConfig::new().max_entries(2))?;
let a = cache.get_or_insert_with(1, || String::from("one"));
let b = cache.get_or_insert_with(1, || String::from("uno"));
assert_eq!(a, b);
assert_eq!(b, "one");
assert_eq!(cache.len(), 1);

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{
        atomic::{AtomicU64, Ordering},
        OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
    time::{Duration, Instant},
};

use crate::{error::cache::Error as E, Error};

static GLOBAL: OnceLock<CacheConfig> = OnceLock::new();

/// Installs the configuration used by every process wide value cache.
///
/// This must be called before the first value is constructed. Once any
/// cache has been built (or this routine has already succeeded), this
/// returns a configuration error.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use nanotemporals::cache::{self, CacheConfig};
///
/// let config = CacheConfig::new()
///     .max_entries(100_000)
///     .time_to_idle(Duration::from_secs(300));
/// cache::configure_global(config)?;
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn configure_global(config: CacheConfig) -> Result<(), Error> {
    config.validate()?;
    GLOBAL.set(config).map_err(|_| Error::from(E::AlreadyInitialized))
}

/// Returns the process wide configuration, freezing the default one if
/// none has been installed.
pub(crate) fn global_config() -> &'static CacheConfig {
    GLOBAL.get_or_init(CacheConfig::default)
}

/// Settings for a [`Cache`].
///
/// The default is at most 10,000 entries, each of which expires after 60
/// seconds without being accessed.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    max_entries: usize,
    time_to_idle: Duration,
}

impl CacheConfig {
    /// Returns the default configuration.
    pub fn new() -> CacheConfig {
        CacheConfig {
            max_entries: 10_000,
            time_to_idle: Duration::from_secs(60),
        }
    }

    /// Sets the maximum number of entries.
    ///
    /// A cache refuses to be built with a maximum of zero.
    pub fn max_entries(self, max_entries: usize) -> CacheConfig {
        CacheConfig { max_entries, ..self }
    }

    /// Sets how long an entry may go without being accessed before it is
    /// eligible for removal.
    pub fn time_to_idle(self, time_to_idle: Duration) -> CacheConfig {
        CacheConfig { time_to_idle, ..self }
    }

    /// Returns the configured maximum number of entries.
    pub fn get_max_entries(&self) -> usize {
        self.max_entries
    }

    /// Returns the configured idle expiry.
    pub fn get_time_to_idle(&self) -> Duration {
        self.time_to_idle
    }

    fn validate(&self) -> Result<(), Error> {
        if self.max_entries == 0 {
            return Err(E::ZeroCapacity.into());
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> CacheConfig {
        CacheConfig::new()
    }
}

/// A bounded interning cache with expire-after-access semantics.
///
/// Lookups take a shared lock. Each entry's last access time is an atomic,
/// so a hit never needs exclusive access.
///
/// Insertion is "first writer wins": the value is built outside of any
/// lock, and if another thread inserted an entry for the same key in the
/// meantime, the other thread's value is returned and the new one is
/// dropped.
///
/// Entries are removed only while inserting into a full cache. Expired
/// entries go first. If that doesn't free any room, the least recently
/// accessed tenth of the entries is dropped.
#[derive(Debug)]
pub struct Cache<K, V> {
    config: CacheConfig,
    epoch: Instant,
    map: RwLock<HashMap<K, Entry<V>>>,
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    /// Nanoseconds since the cache's epoch.
    last_access: AtomicU64,
}

impl<K: Eq + Hash, V: Clone> Cache<K, V> {
    /// Creates a new empty cache.
    ///
    /// This returns a configuration error when the maximum number of
    /// entries is zero.
    pub fn new(config: CacheConfig) -> Result<Cache<K, V>, Error> {
        config.validate()?;
        Ok(Cache::with_valid_config(config))
    }

    /// Creates a cache from the process wide configuration.
    pub(crate) fn global() -> Cache<K, V> {
        Cache::with_valid_config(global_config().clone())
    }

    fn with_valid_config(config: CacheConfig) -> Cache<K, V> {
        Cache { config, epoch: Instant::now(), map: RwLock::new(HashMap::new()) }
    }

    /// Returns the value for `key`, if present and not yet expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.now();
        let map = self.read();
        let entry = map.get(key)?;
        if self.is_expired(entry, now) {
            return None;
        }
        entry.last_access.store(now, Ordering::Relaxed);
        Some(entry.value.clone())
    }

    /// Returns the value for `key`, inserting the one built by `make` if
    /// there is none.
    pub fn get_or_insert_with(&self, key: K, make: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = make();
        let now = self.now();
        let mut map = self.write();
        if let Some(entry) = map.get(&key) {
            if !self.is_expired(entry, now) {
                entry.last_access.store(now, Ordering::Relaxed);
                return entry.value.clone();
            }
        }
        if !map.contains_key(&key) && map.len() >= self.config.max_entries {
            self.evict(&mut map, now);
        }
        let entry =
            Entry { value: value.clone(), last_access: AtomicU64::new(now) };
        map.insert(key, entry);
        value
    }

    /// Returns the number of entries, including ones that have expired but
    /// haven't been removed yet.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true when this cache has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Returns the configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn evict(&self, map: &mut HashMap<K, Entry<V>>, now: u64) {
        #[cfg(feature = "logging")]
        let before = map.len();
        map.retain(|_, entry| !self.is_expired(entry, now));
        if map.len() < self.config.max_entries {
            debug!(
                "memoization cache dropped {} expired entries",
                before - map.len(),
            );
            return;
        }

        let mut accessed: Vec<u64> = map
            .values()
            .map(|entry| entry.last_access.load(Ordering::Relaxed))
            .collect();
        accessed.sort_unstable();
        let count = (map.len() / 10).max(1);
        // Everything accessed at or before the cutoff goes. Ties may take a
        // few extra entries with them.
        let cutoff = accessed[count - 1];
        map.retain(|_, entry| {
            entry.last_access.load(Ordering::Relaxed) > cutoff
        });
        debug!(
            "memoization cache is full ({} entries), \
             dropped {} least recently used entries",
            self.config.max_entries,
            before - map.len(),
        );
    }

    fn is_expired(&self, entry: &Entry<V>, now: u64) -> bool {
        let idle = now.saturating_sub(entry.last_access.load(Ordering::Relaxed));
        u128::from(idle) > self.config.time_to_idle.as_nanos()
    }

    fn now(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, Entry<V>>> {
        // The map is never left in an inconsistent state by a panic, so a
        // poisoned lock is still usable.
        self.map.read().unwrap_or_else(|err| err.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, Entry<V>>> {
        self.map.write().unwrap_or_else(|err| err.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn first_writer_wins() {
        let cache: Cache<i64, Arc<str>> =
            Cache::new(CacheConfig::new()).unwrap();
        let a = cache.get_or_insert_with(5, || Arc::from("first"));
        let b = cache.get_or_insert_with(5, || Arc::from("second"));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(&*b, "first");
        assert_eq!(cache.get(&5).as_deref(), Some("first"));
        assert_eq!(cache.get(&6), None);
    }

    #[test]
    fn full_cache_evicts() {
        let _ = env_logger::try_init();

        let cache: Cache<i64, i64> =
            Cache::new(CacheConfig::new().max_entries(10)).unwrap();
        for n in 0..10 {
            cache.get_or_insert_with(n, || n);
        }
        assert_eq!(cache.len(), 10);
        // Touch everything but key 0, so that it's the least recently used.
        for n in 1..10 {
            assert_eq!(cache.get(&n), Some(n));
        }
        cache.get_or_insert_with(10, || 10);
        assert!(cache.len() <= 10);
        assert_eq!(cache.get(&0), None);
        assert_eq!(cache.get(&10), Some(10));
    }

    #[test]
    fn idle_entries_expire() {
        let config = CacheConfig::new()
            .max_entries(3)
            .time_to_idle(Duration::from_nanos(0));
        let cache: Cache<i64, i64> = Cache::new(config).unwrap();
        cache.get_or_insert_with(1, || 1);
        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(cache.get(&1), None);
        // An expired entry is replaced rather than returned.
        assert_eq!(cache.get_or_insert_with(1, || 100), 100);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err =
            Cache::<i64, i64>::new(CacheConfig::new().max_entries(0))
                .unwrap_err();
        assert!(err.is_configuration());
        insta::assert_snapshot!(
            err,
            @"memoization cache capacity must be greater than zero"
        );
    }

    #[test]
    fn global_configuration_is_frozen_on_first_use() {
        let _ = global_config();
        let err = configure_global(CacheConfig::new()).unwrap_err();
        assert!(err.is_configuration());
    }
}
