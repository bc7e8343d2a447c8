//! Live visit tracking.
//!
//! At most one visit is live at a time. `visitStarted` is the only event
//! that replaces it; every other visit event is checked against it and
//! dropped on mismatch.

use tracing::debug;

use crate::identifiers::VisitId;

// ============================================================================
// VisitRegistry
// ============================================================================

/// Tracks the single in-flight visit id.
#[derive(Debug, Default, Clone)]
pub struct VisitRegistry {
    current: Option<VisitId>,
    stale_discarded: u64,
}

impl VisitRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `visit_id` the live visit, superseding any previous one.
    pub fn start(&mut self, visit_id: VisitId) {
        if let Some(previous) = self.current.as_ref() {
            debug!(previous = %previous, visit_id = %visit_id, "Visit superseded");
        }
        self.current = Some(visit_id);
    }

    /// Returns the live visit id.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&VisitId> {
        self.current.as_ref()
    }

    /// Returns `true` if `visit_id` names the live visit.
    ///
    /// An absent id matches an empty registry, so failures synthesized
    /// before any visit started still reach the host.
    #[inline]
    #[must_use]
    pub fn is_current(&self, visit_id: Option<&VisitId>) -> bool {
        self.current.as_ref() == visit_id
    }

    /// Checks `visit_id` against the live visit, counting mismatches.
    ///
    /// Returns `true` when the event should be processed.
    pub fn admit(&mut self, entry_point: &str, visit_id: Option<&VisitId>) -> bool {
        if self.is_current(visit_id) {
            return true;
        }

        self.stale_discarded += 1;
        debug!(
            entry_point,
            visit_id = visit_id.map(VisitId::as_str),
            current = self.current.as_ref().map(VisitId::as_str),
            "Discarding stale visit event"
        );
        false
    }

    /// Number of events dropped as stale so far.
    #[inline]
    #[must_use]
    pub fn stale_discarded(&self) -> u64 {
        self.stale_discarded
    }

    /// Forgets the live visit.
    pub fn clear(&mut self) {
        self.current = None;
    }
}

// ============================================================================
// Tests
// ============================================================================
