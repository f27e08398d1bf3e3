//! Replay Cache for request nonces
//!
//! Every request carries a fresh random nonce. Authentication binds the nonce
//! to the packet, but a captured datagram still opens fine a second time. This
//! cache remembers the nonces accepted per controller so an identical datagram
//! is rejected while its entry is alive.
//!
//! Entries expire after a TTL and the cache is bounded; the oldest entries are
//! evicted first when it is full.

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use crate::core::device_id::DeviceId;
use crate::core::packet::Nonce;

/// Key for cache entries - controller id plus nonce
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    device: DeviceId,
    nonce: Nonce,
}

/// TTL-based replay cache with FIFO eviction
///
/// Entries are inserted in time order, so expiry and eviction both pop from
/// the front of the queue.
#[derive(Debug)]
pub struct ReplayCache {
    /// Nonces currently remembered
    seen: HashSet<CacheKey>,
    /// Insertion order with insertion time
    insertion_order: VecDeque<(Instant, CacheKey)>,
    /// Time-to-live for cache entries
    ttl: Duration,
    /// Maximum number of entries to prevent unbounded growth
    max_entries: usize,
}

impl ReplayCache {
    /// Create a new replay cache with default settings
    ///
    /// Default TTL: 5 minutes
    /// Default max entries: 10,000
    pub fn new() -> Self {
        Self::with_settings(Duration::from_secs(300), 10_000)
    }

    /// Create a replay cache with custom settings
    pub fn with_settings(ttl: Duration, max_entries: usize) -> Self {
        Self {
            seen: HashSet::new(),
            insertion_order: VecDeque::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Record `nonce` for `device`.
    ///
    /// Returns true if the pair was already seen (a replay), false if new.
    #[instrument(skip_all, fields(device = %device))]
    pub fn is_replay(&mut self, device: &DeviceId, nonce: &Nonce) -> bool {
        self.cleanup_expired();

        let key = CacheKey {
            device: *device,
            nonce: *nonce,
        };

        if self.seen.contains(&key) {
            warn!(?nonce, "Replay detected - nonce already accepted");
            return true;
        }

        if self.seen.len() >= self.max_entries {
            let to_remove = self.seen.len() - self.max_entries + 1;
            self.remove_oldest_entries(to_remove);
        }

        self.seen.insert(key.clone());
        self.insertion_order.push_back((Instant::now(), key));
        false
    }

    /// Remove expired entries from the cache
    fn cleanup_expired(&mut self) {
        let now = Instant::now();
        let mut removed = 0;

        while let Some((added_at, _)) = self.insertion_order.front() {
            if now.duration_since(*added_at) < self.ttl {
                break;
            }
            if let Some((_, key)) = self.insertion_order.pop_front() {
                self.seen.remove(&key);
                removed += 1;
            }
        }

        if removed > 0 {
            debug!("Cleaned up {} expired replay cache entries", removed);
        }
    }

    /// Remove oldest entries when cache is full
    #[inline]
    fn remove_oldest_entries(&mut self, count: usize) {
        for _ in 0..count {
            if let Some((_, key)) = self.insertion_order.pop_front() {
                self.seen.remove(&key);
            }
        }

        debug!(
            "Removed {} oldest replay cache entries due to size limit",
            count
        );
    }

    /// Number of remembered nonces
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Get current cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.seen.len(),
            max_entries: self.max_entries,
            ttl_seconds: self.ttl.as_secs(),
        }
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.seen.clear();
        self.insertion_order.clear();
        debug!("Replay cache cleared");
    }
}

impl Default for ReplayCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the replay cache
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Current number of entries
    pub entries: usize,
    /// Maximum allowed entries
    pub max_entries: usize,
    /// TTL in seconds
    pub ttl_seconds: u64,
}
