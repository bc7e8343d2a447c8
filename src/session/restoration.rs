//! Restoration identifier cache.
//!
//! Maps a host navigation context to the last restoration id the script
//! runtime reported for it, so a later visit from the same context can ask
//! for scroll/snapshot restoration. One entry per context, last write wins.
//!
//! The cache is bounded: once `capacity` contexts are stored, the least
//! recently used one is evicted. Reads and writes both count as use.

// ============================================================================
// Imports
// ============================================================================

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use tracing::trace;

use crate::identifiers::{ContextKey, RestorationId};

// ============================================================================
// Types
// ============================================================================

/// Insertion-ordered map; the front is the least recently used entry.
type RestorationMap = IndexMap<ContextKey, RestorationId, FxBuildHasher>;

// ============================================================================
// RestorationCache
// ============================================================================

/// Bounded LRU cache of restoration ids keyed by navigation context.
#[derive(Debug, Clone)]
pub struct RestorationCache {
    entries: RestorationMap,
    capacity: usize,
}

impl RestorationCache {
    /// Creates an empty cache holding at most `capacity` contexts.
    ///
    /// A zero capacity is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RestorationMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            capacity,
        }
    }

    /// Records `restoration_id` for `context`, replacing any previous entry.
    pub fn insert(&mut self, context: ContextKey, restoration_id: RestorationId) {
        self.entries.shift_remove(&context);

        if self.entries.len() >= self.capacity
            && let Some((evicted, _)) = self.entries.shift_remove_index(0)
        {
            trace!(context = %evicted, "Evicted restoration entry");
        }

        self.entries.insert(context, restoration_id);
    }

    /// Returns the restoration id for `context`, marking it recently used.
    pub fn get(&mut self, context: &ContextKey) -> Option<RestorationId> {
        let restoration_id = self.entries.shift_remove(context)?;
        self.entries.insert(context.clone(), restoration_id.clone());
        Some(restoration_id)
    }

    /// Returns the restoration id for `context` without touching recency.
    #[inline]
    #[must_use]
    pub fn peek(&self, context: &ContextKey) -> Option<&RestorationId> {
        self.entries.get(context)
    }

    /// Number of cached contexts.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached contexts.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ============================================================================
// Tests
// ============================================================================
