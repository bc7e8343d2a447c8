//! Document lifecycle and navigation interception.
//!
//! These are the surface's own notifications: a document started or
//! finished loading, a load failed, or the page tried to navigate.

use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::protocol::VisitAction;

use super::SessionCore;

// ============================================================================
// NavigationDecision
// ============================================================================

/// What the surface should do with a navigation it intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Let the surface load the document itself.
    Proceed,
    /// Cancel the load; the host was asked to route a visit instead.
    Override,
}

impl NavigationDecision {
    /// Returns `true` if the surface must cancel its own load.
    #[inline]
    #[must_use]
    pub const fn should_override(&self) -> bool {
        matches!(self, Self::Override)
    }
}

// ============================================================================
// SessionCore - Document Lifecycle
// ============================================================================

impl SessionCore {
    /// A new document started loading; it carries no runtime yet.
    pub fn on_document_started(&mut self, location: &str) {
        trace!(session_id = %self.id, location = %location, "Document started");
        self.flags.begin_cold_boot();
        self.document_generation = self.document_generation.wrapping_add(1);
    }

    /// A document finished loading.
    ///
    /// `bridge_present` is the result of probing the document for the
    /// bridge. When it is missing and no injection is outstanding, the
    /// shim is injected. The host hears `on_page_finished` either way.
    pub fn on_document_finished(&mut self, location: &str, bridge_present: bool) {
        debug!(
            session_id = %self.id,
            location = %location,
            bridge_present,
            "Document finished"
        );

        if !bridge_present && !self.flags.bridge_injection_in_progress() {
            self.flags.begin_injection();

            let injected = self.bridge.as_ref().is_some_and(|bridge| bridge.inject());
            if !injected {
                self.reset_to_cold_boot();
            }
        }

        self.notify(|adapter| adapter.on_page_finished());
    }

    /// A document finished loading but could not be probed for the bridge.
    ///
    /// Nothing will confirm the runtime, so the session falls back to cold
    /// boot and the next visit loads the document again.
    pub fn on_document_probe_failed(&mut self, location: &str) {
        warn!(session_id = %self.id, location = %location, "Document probe failed");

        self.reset_to_cold_boot();
        self.notify(|adapter| adapter.on_page_finished());
    }

    /// The surface reported a load error.
    pub fn on_received_error(&mut self, error_code: i32) {
        warn!(session_id = %self.id, error_code, "Load error");

        self.reset_to_cold_boot();
        self.notify(|adapter| adapter.on_received_error(error_code));
    }

    /// The surface reported an HTTP error status. Subresource errors are
    /// ignored.
    pub fn on_received_http_error(&mut self, status_code: i32, for_main_frame: bool) {
        if !for_main_frame {
            trace!(status_code, "Ignoring subresource HTTP error");
            return;
        }
        self.on_received_error(status_code);
    }

    /// The page tried to navigate to `location`.
    ///
    /// Before the runtime is ready the surface loads the document itself and
    /// the host hears `completed_by_fallback`. Once ready the load is
    /// cancelled and proposed to the host as an `advance` visit. Repeats
    /// within the fallback debounce window are not reported again.
    pub fn intercept_navigation(&mut self, location: &str, now: Instant) -> NavigationDecision {
        let debounce = self.options.fallback_debounce;
        let fresh = self
            .last_interception
            .is_none_or(|previous| now.saturating_duration_since(previous) >= debounce);

        if fresh {
            self.last_interception = Some(now);
        }

        if !self.flags.ready() || self.flags.cold_boot_in_progress() {
            if fresh {
                self.notify(|adapter| adapter.completed_by_fallback(location));
            } else {
                trace!(location = %location, "Duplicate fallback navigation");
            }
            return NavigationDecision::Proceed;
        }

        if fresh {
            self.notify(|adapter| {
                adapter.visit_proposed_to_location_with_action(location, VisitAction::Advance);
            });
        } else {
            trace!(location = %location, "Duplicate navigation proposal");
        }
        NavigationDecision::Override
    }
}

// ============================================================================
// Tests
// ============================================================================
