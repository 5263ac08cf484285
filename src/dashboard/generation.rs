//! Request generations
//!
//! Every fetch for a logical resource takes a ticket. When the response
//! arrives it is applied only if no newer request for the same resource
//! was started in the meantime.
//!
//! Generations come from one counter shared by all keys, so they stay
//! comparable across resources and are never reused after a key is
//! released.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

/// Logical resources fetched by the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    /// Case records plus virus totals, published together as a snapshot
    Snapshot,
    /// Continent totals for one virus
    ContinentTotals { virus: String },
    /// Drill-down for one country and virus
    CountryDetail { country: String, virus: String },
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKey::Snapshot => write!(f, "snapshot"),
            ResourceKey::ContinentTotals { virus } => write!(f, "continents/{}", virus),
            ResourceKey::CountryDetail { country, virus } => {
                write!(f, "country/{}/{}", country, virus)
            }
        }
    }
}

/// Ticket for one in-flight request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    pub key: K,
    pub generation: u64,
}

/// Latest generation per key
///
/// Only keys with a request in flight are tracked; [`finish`](Self::finish)
/// releases a key once its newest ticket completes.
#[derive(Debug)]
pub struct GenerationTracker<K> {
    state: Mutex<TrackerState<K>>,
}

#[derive(Debug)]
struct TrackerState<K> {
    next: u64,
    latest: HashMap<K, u64>,
}

impl<K: Clone + Eq + Hash> Default for GenerationTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash> GenerationTracker<K> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TrackerState {
                next: 0,
                latest: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerState<K>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a request for `key`, superseding any earlier ticket
    pub fn begin(&self, key: K) -> Ticket<K> {
        let mut state = self.lock();
        state.next += 1;
        let generation = state.next;
        state.latest.insert(key.clone(), generation);
        Ticket { key, generation }
    }

    /// Whether `ticket` is still the newest request for its key
    pub fn is_current(&self, ticket: &Ticket<K>) -> bool {
        self.lock().latest.get(&ticket.key) == Some(&ticket.generation)
    }

    /// Release the key if `ticket` is still its newest request
    pub fn finish(&self, ticket: &Ticket<K>) {
        let mut state = self.lock();
        if state.latest.get(&ticket.key) == Some(&ticket.generation) {
            state.latest.remove(&ticket.key);
        }
    }

    /// Latest in-flight generation for `key` (0 if none)
    pub fn current(&self, key: &K) -> u64 {
        self.lock().latest.get(key).copied().unwrap_or(0)
    }

    /// Number of keys with a request in flight
    pub fn in_flight(&self) -> usize {
        self.lock().latest.len()
    }
}
