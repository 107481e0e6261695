//! In-process memoization of pipeline results.
//!
//! Entries are keyed by [`CacheKey`](crate::config::CacheKey). Each key has at
//! most one entry. When an entry is older than `max_age` (if set) it is
//! recomputed; when the cache is full the oldest entry is evicted. With the
//! default capacity of 1, asking for a different key replaces the entry.
//!
//! Computation runs under the cache lock, so concurrent callers asking for
//! the same key compute it once. A failed computation leaves the cache as it
//! was.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Time source for entry ages.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests and replay.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Entry<V> {
    key: String,
    value: Arc<V>,
    stored_at: Instant,
}

/// Bounded, optionally expiring cache of computed values.
pub struct ResultCache<V> {
    clock: Arc<dyn Clock>,
    max_age: Option<Duration>,
    capacity: usize,
    entries: Mutex<VecDeque<Entry<V>>>,
}

impl<V> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl<V> ResultCache<V> {
    /// Capacity 1, no expiry.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            max_age: None,
            capacity: 1,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// At least one entry is always kept.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, entry: &Entry<V>, now: Instant) -> bool {
        self.max_age
            .map_or(true, |age| now.saturating_duration_since(entry.stored_at) <= age)
    }

    /// Cached value for `key`, or the result of `compute` (stored on success).
    pub fn get_or_compute<E>(
        &self,
        key: &str,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        let mut entries = self.lock();
        let now = self.clock.now();

        if let Some(pos) = entries.iter().position(|e| e.key == key) {
            if self.is_fresh(&entries[pos], now) {
                tracing::debug!(key, "result cache hit");
                return Ok(Arc::clone(&entries[pos].value));
            }
            tracing::debug!(key, "result cache entry expired");
            entries.remove(pos);
        }

        let value = Arc::new(compute()?);
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(Entry {
            key: key.to_string(),
            value: Arc::clone(&value),
            stored_at: self.clock.now(),
        });
        Ok(value)
    }

    /// Fresh cached value, without computing.
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        let entries = self.lock();
        let now = self.clock.now();
        entries
            .iter()
            .find(|e| e.key == key && self.is_fresh(e, now))
            .map(|e| Arc::clone(&e.value))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
