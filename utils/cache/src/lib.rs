use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::MutexGuard;

use lru::LruCache;
use sha1::Digest;
use sha1::Sha1;

/// A minimal bounded LRU cache behind a `std` mutex.
///
/// Used to memoize per-session work (e.g. buffer extraction passes) without
/// resorting to process-wide mutable state. Eviction is strictly
/// least-recently-used, so a long session can never grow the cache past its
/// configured capacity.
pub struct BoundedCache<K, V> {
    inner: Mutex<LruCache<K, V>>,
}

impl<K: Eq + Hash, V> std::fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash,
{
    /// Creates a cache with the provided non-zero capacity.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Builds a cache if `capacity` is non-zero, returning `None` otherwise.
    #[must_use]
    pub fn try_with_capacity(capacity: usize) -> Option<Self> {
        NonZeroUsize::new(capacity).map(Self::new)
    }

    /// Returns a clone of the cached value corresponding to `key`, if present.
    /// Marks the entry as most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        lock(&self.inner).get(key).cloned()
    }

    /// Returns whether `key` is present without refreshing its recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        lock(&self.inner).contains(key)
    }

    /// Inserts `value` for `key`, returning the previous entry if it existed.
    /// The least-recently-used entry is evicted when the cache is full.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        lock(&self.inner).put(key, value)
    }

    /// Removes the entry for `key` if it exists, returning it.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        lock(&self.inner).pop(key)
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        lock(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.inner).is_empty()
    }

    /// Clears all entries from the cache.
    pub fn clear(&self) {
        lock(&self.inner).clear();
    }
}

fn lock<K, V>(m: &Mutex<LruCache<K, V>>) -> MutexGuard<'_, LruCache<K, V>>
where
    K: Eq + Hash,
{
    // A poisoned lock only means another thread panicked mid-operation; the
    // cache itself stays structurally valid, so keep serving entries.
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Computes the SHA-1 digest of `bytes`.
///
/// Useful for content-based cache keys when you want to avoid staleness
/// caused by length-only keys.
#[must_use]
pub fn sha1_digest(bytes: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    let mut out = [0; 20];
    out.copy_from_slice(&result);
    out
}
