use std::time::Duration;
use std::time::Instant;

use codepup_utils_cache::BoundedCache;
use codepup_utils_cache::sha1_digest;

use crate::extract::ExtractOutcome;

/// Minimum wall-clock spacing between full re-extractions of an unchanged
/// buffer signature. Chunks routinely arrive faster than this; the small
/// staleness window buys back the cost of repeated full-buffer scans.
pub(crate) const EXTRACT_THROTTLE: Duration = Duration::from_millis(100);

/// How much of the buffer tail participates in the cache key. Appends only
/// ever change the tail, so (length, tail digest) identifies a buffer state
/// without hashing the whole thing.
const SIGNATURE_SUFFIX_LEN: usize = 200;

const CACHE_CAPACITY: usize = 50;

type Signature = (usize, [u8; 20]);

/// Instance-owned memo for extraction passes.
///
/// Bounded, evicted oldest-first, and discarded with its session. No
/// process-wide state, so sessions stay independently testable.
#[derive(Debug)]
pub(crate) struct ExtractionMemo {
    cache: BoundedCache<Signature, ExtractOutcome>,
    throttle: Duration,
    last_run: Option<Instant>,
}

impl ExtractionMemo {
    pub(crate) fn new() -> Self {
        Self::with_throttle(EXTRACT_THROTTLE)
    }

    pub(crate) fn with_throttle(throttle: Duration) -> Self {
        let Some(cache) = BoundedCache::try_with_capacity(CACHE_CAPACITY) else {
            unreachable!("cache capacity is a non-zero constant");
        };
        Self {
            cache,
            throttle,
            last_run: None,
        }
    }

    fn signature(buffer: &str) -> Signature {
        let mut start = buffer.len().saturating_sub(SIGNATURE_SUFFIX_LEN);
        while start < buffer.len() && !buffer.is_char_boundary(start) {
            start += 1;
        }
        (buffer.len(), sha1_digest(buffer[start..].as_bytes()))
    }

    /// Returns the cached outcome for this buffer state, but only while the
    /// throttle window since the last real extraction is still open. Outside
    /// the window a fresh pass runs even for a known signature, bounding how
    /// stale a served outcome can get.
    pub(crate) fn lookup(&self, buffer: &str) -> Option<ExtractOutcome> {
        let elapsed = self.last_run?.elapsed();
        if elapsed >= self.throttle {
            return None;
        }
        self.cache.get(&Self::signature(buffer))
    }

    /// Records the outcome of a real extraction pass.
    pub(crate) fn store(&mut self, buffer: &str, outcome: &ExtractOutcome) {
        self.cache.insert(Self::signature(buffer), outcome.clone());
        self.last_run = Some(Instant::now());
    }
}
