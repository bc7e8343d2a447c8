//! Host-facing callback contracts.
//!
//! [`SessionAdapter`] is what the embedding application implements to hear
//! about visits. [`ProgressIndicator`] is the optional UI hook for hiding the
//! loading overlay and the pull-to-refresh spinner.
//!
//! All callbacks run on the session's event loop, one at a time.

use crate::protocol::VisitAction;

// ============================================================================
// SessionAdapter
// ============================================================================

/// Callbacks the session makes into the host application.
///
/// Required before any visit; see
/// [`SessionCore::visit`](crate::session::SessionCore::visit).
pub trait SessionAdapter: Send + Sync {
    /// A document finished loading in the surface.
    ///
    /// Fires after the bridge injection attempt, whatever its outcome.
    fn on_page_finished(&self);

    /// The loaded page does or does not support the protocol.
    fn on_page_supports_turbolinks(&self, supported: bool);

    /// The surface reported a load error (or a main-frame HTTP error).
    fn on_received_error(&self, error_code: i32);

    /// A protocol-mediated request failed.
    fn request_failed_with_status_code(&self, status_code: i32);

    /// The script runtime invalidated the page; a cold boot follows.
    fn page_invalidated(&self);

    /// The live visit completed.
    fn visit_completed(&self);

    /// A navigation was handled by a plain document load instead of a visit.
    fn completed_by_fallback(&self, location: &str);

    /// The page proposes a visit; the host decides how to route it.
    fn visit_proposed_to_location_with_action(&self, location: &str, action: VisitAction);

    /// The user pulled to refresh.
    fn reload_triggered_by_pull_to_refresh(&self);

    /// The page does not support the protocol and the bridge could not start.
    ///
    /// Runs after `on_page_supports_turbolinks(false)`.
    fn bridge_injection_failed(&self);
}

// ============================================================================
// ProgressIndicator
// ============================================================================

/// Host UI hooks for loading feedback.
pub trait ProgressIndicator: Send + Sync {
    /// Hides the visit progress overlay.
    fn hide_progress(&self);

    /// Stops the pull-to-refresh spinner.
    fn stop_refreshing(&self);
}
