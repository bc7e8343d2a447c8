//! Script → native entry points.
//!
//! Every visit-scoped event except `visitStarted` is checked against the
//! live visit id; stale events are counted and dropped.

use tracing::{debug, error, warn};

use crate::identifiers::{RestorationId, VisitId};
use crate::protocol::{BridgeCall, BridgeMessage, VisitAction};

use super::{SessionCore, VisitRequest};

// ============================================================================
// Constants
// ============================================================================

/// Status reported when the runtime says it is present but not ready.
pub const RUNTIME_NOT_READY_STATUS: i32 = 500;

/// Status reported when an in-flight visit exceeds the visit timeout.
pub const VISIT_TIMEOUT_STATUS: i32 = 408;

// ============================================================================
// SessionCore - Bridge Events
// ============================================================================

impl SessionCore {
    /// Routes a decoded bridge message to its entry point.
    pub fn handle_bridge_message(&mut self, message: BridgeMessage) {
        debug!(
            session_id = %self.id,
            entry_point = message.entry_point(),
            visit_id = message.visit_id().map(VisitId::as_str),
            "Bridge message"
        );

        match message {
            BridgeMessage::VisitProposedToLocationWithAction { location, action } => {
                self.visit_proposed_to_location_with_action(&location, action);
            }
            BridgeMessage::VisitStarted {
                visit_id,
                has_cached_snapshot,
            } => self.visit_started(visit_id, has_cached_snapshot),
            BridgeMessage::VisitRequestCompleted { visit_id } => {
                self.visit_request_completed(&visit_id);
            }
            BridgeMessage::VisitRequestFailedWithStatusCode {
                visit_id,
                status_code,
            } => self.visit_request_failed_with_status_code(&visit_id, status_code),
            BridgeMessage::VisitRendered { visit_id } => self.visit_rendered(&visit_id),
            BridgeMessage::VisitCompleted {
                visit_id,
                restoration_id,
            } => self.visit_completed(&visit_id, restoration_id),
            BridgeMessage::ScriptRuntimeReady { is_ready } => self.on_script_runtime_ready(is_ready),
            BridgeMessage::ScriptRuntimeAbsent => self.on_script_runtime_absent(),
            BridgeMessage::PageInvalidated => self.on_page_invalidated(),
        }
    }

    /// Forwards a proposal from the page to the host.
    pub fn visit_proposed_to_location_with_action(&mut self, location: &str, action: VisitAction) {
        self.notify(|adapter| adapter.visit_proposed_to_location_with_action(location, action));
    }

    /// A visit started.
    ///
    /// Records `visit_id` as the live visit, then asks the runtime to change
    /// history, issue the request and load any cached snapshot, in that order.
    pub fn visit_started(&mut self, visit_id: VisitId, has_cached_snapshot: bool) {
        debug!(visit_id = %visit_id, has_cached_snapshot, "Visit started");

        self.registry.start(visit_id.clone());
        self.arm_visit();

        self.send(&BridgeCall::change_history(&visit_id));
        self.send(&BridgeCall::issue_request(&visit_id));
        self.send(&BridgeCall::load_cached_snapshot(&visit_id));
    }

    /// The network request of a visit completed.
    pub fn visit_request_completed(&mut self, visit_id: &VisitId) {
        if self.registry.admit("visitRequestCompleted", Some(visit_id)) {
            self.send(&BridgeCall::load_response(visit_id));
        }
    }

    /// The network request of a visit failed.
    pub fn visit_request_failed_with_status_code(&mut self, visit_id: &VisitId, status_code: i32) {
        self.request_failed("visitRequestFailedWithStatusCode", Some(visit_id), status_code);
    }

    /// The runtime rendered a visit.
    pub fn visit_rendered(&mut self, visit_id: &VisitId) {
        let current = self.registry.admit("visitRendered", Some(visit_id));
        self.hide_progress(current);
    }

    /// A visit completed.
    ///
    /// Caches `restoration_id` under the bound context, then notifies the host.
    pub fn visit_completed(&mut self, visit_id: &VisitId, restoration_id: RestorationId) {
        if !self.registry.admit("visitCompleted", Some(visit_id)) {
            return;
        }

        match self.context.clone() {
            Some(context) => self.restorations.insert(context, restoration_id),
            None => debug!(visit_id = %visit_id, "No context bound; restoration id not cached"),
        }

        self.settle_visit();
        self.notify(|adapter| adapter.visit_completed());
        self.with_progress(|progress| progress.stop_refreshing());
    }

    /// The runtime reported whether it initialised.
    ///
    /// On success the pending location is revisited through the runtime.
    /// Otherwise the session resets and reports a failure for the live
    /// visit with [`RUNTIME_NOT_READY_STATUS`].
    pub fn on_script_runtime_ready(&mut self, is_ready: bool) {
        if !is_ready {
            warn!(session_id = %self.id, "Script runtime present but not ready");
            self.reset_to_cold_boot();
            let visit_id = self.registry.current().cloned();
            self.request_failed("onScriptRuntimeReady", visit_id.as_ref(), RUNTIME_NOT_READY_STATUS);
            return;
        }

        self.notify(|adapter| adapter.on_page_supports_turbolinks(true));
        self.flags.mark_ready();
        debug!(session_id = %self.id, "Script runtime ready");

        match self.location.clone() {
            Some(location) => {
                let action = std::mem::take(&mut self.pending_action);
                self.visit_location_with_action(&location, action);
            }
            None => debug!("No pending location to revisit"),
        }
    }

    /// The page does not carry the script runtime.
    pub fn on_script_runtime_absent(&mut self) {
        warn!(session_id = %self.id, location = ?self.location, "Script runtime absent");

        self.reset_to_cold_boot();
        self.notify(|adapter| adapter.on_page_supports_turbolinks(false));
        self.with_progress(|progress| progress.hide_progress());
        self.notify(|adapter| adapter.bridge_injection_failed());
    }

    /// The runtime invalidated the page; reloads the current location cold.
    pub fn on_page_invalidated(&mut self) {
        debug!(session_id = %self.id, "Page invalidated");

        self.reset_to_cold_boot();
        self.notify(|adapter| adapter.page_invalidated());

        let Some(location) = self.location.clone() else {
            warn!(session_id = %self.id, "Page invalidated with no location to reload");
            return;
        };

        if let Err(e) = self.visit(VisitRequest::new(location)) {
            error!(session_id = %self.id, error = %e, "Failed to reload invalidated page");
        }
    }

    /// The in-flight visit exceeded the visit timeout.
    ///
    /// Resets to cold boot and reports [`VISIT_TIMEOUT_STATUS`] for the
    /// live visit. Does nothing when no visit is in flight.
    pub fn on_visit_timeout(&mut self) {
        if !self.visit_in_flight {
            return;
        }

        warn!(
            session_id = %self.id,
            visit_id = self.registry.current().map(VisitId::as_str),
            "Visit timed out"
        );

        self.reset_to_cold_boot();
        let visit_id = self.registry.current().cloned();
        self.request_failed("visitTimeout", visit_id.as_ref(), VISIT_TIMEOUT_STATUS);
    }

    fn request_failed(&mut self, entry_point: &str, visit_id: Option<&VisitId>, status_code: i32) {
        let current = self.registry.admit(entry_point, visit_id);
        self.hide_progress(current);

        if current {
            self.settle_visit();
            self.notify(|adapter| adapter.request_failed_with_status_code(status_code));
        }
    }

    /// Hides loading feedback after a visit event.
    ///
    /// Before readiness both indicators go, since a cold boot may have raced
    /// the event. For a superseded visit, hiding progress means stopping the
    /// refresh spinner; the overlay belongs to the live visit and stays up.
    fn hide_progress(&self, current: bool) {
        self.with_progress(|progress| {
            if !self.flags.ready() {
                progress.hide_progress();
                progress.stop_refreshing();
            } else if current {
                progress.hide_progress();
            } else {
                progress.stop_refreshing();
            }
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
