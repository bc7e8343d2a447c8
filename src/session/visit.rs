//! Visit dispatch.
//!
//! A visit takes one of two paths:
//!
//! | State | Path |
//! |-------|------|
//! | `Ready` | `visitLocationWithActionAndRestorationIdentifier` bridge call |
//! | not ready, no cold boot | Full document load with custom headers |
//! | cold boot in progress | Nothing; the pending location is revisited once ready |

use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{BridgeCall, VisitAction};

use super::SessionCore;

// ============================================================================
// VisitRequest
// ============================================================================

/// A request to visit a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRequest {
    /// Absolute URL to visit.
    pub location: String,
    /// Requested action. Overridden by `Restore` when a restore is pending.
    pub action: VisitAction,
    /// Restore this visit from a cached snapshot.
    pub restore_with_cached_snapshot: bool,
}

impl VisitRequest {
    /// Creates an `advance` visit to `location`.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            action: VisitAction::Advance,
            restore_with_cached_snapshot: false,
        }
    }

    /// Sets the visit action.
    #[must_use]
    pub fn action(mut self, action: VisitAction) -> Self {
        self.action = action;
        self
    }

    /// Restores this visit from a cached snapshot.
    #[must_use]
    pub fn restore_with_cached_snapshot(mut self, restore: bool) -> Self {
        self.restore_with_cached_snapshot = restore;
        self
    }
}

impl From<&str> for VisitRequest {
    fn from(location: &str) -> Self {
        Self::new(location)
    }
}

impl From<String> for VisitRequest {
    fn from(location: String) -> Self {
        Self::new(location)
    }
}

// ============================================================================
// SessionCore - Visits
// ============================================================================

impl SessionCore {
    /// Visits a location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precondition`] if no surface or adapter is bound, or
    /// if the location is empty. Nothing is dispatched in that case.
    pub fn visit(&mut self, request: impl Into<VisitRequest>) -> Result<()> {
        let request = request.into();
        self.check_visit_preconditions(&request.location)?;

        if request.restore_with_cached_snapshot {
            self.restore_next_visit = true;
        }

        let action = if self.restore_next_visit {
            VisitAction::Restore
        } else {
            request.action
        };

        debug!(
            session_id = %self.id,
            location = %request.location,
            action = %action,
            state = %self.flags.state(),
            "Visit requested"
        );

        self.location = Some(request.location);
        self.dispatch(action);
        self.restore_next_visit = false;
        Ok(())
    }

    /// Visits a location with `replace`, dropping the surface's history.
    ///
    /// # Errors
    ///
    /// Same preconditions as [`Self::visit`].
    pub fn replace_existing_page(&mut self, location: impl Into<String>) -> Result<()> {
        let location = location.into();
        self.check_visit_preconditions(&location)?;

        debug!(session_id = %self.id, location = %location, "Replacing existing page");

        self.location = Some(location);
        self.dispatch(VisitAction::Replace);
        self.restore_next_visit = false;

        if let Some(bridge) = self.bridge.as_ref() {
            bridge.surface().clear_history();
        }
        Ok(())
    }

    /// Handles a pull-to-refresh gesture.
    ///
    /// Ignored unless pull-to-refresh is enabled. Reloads the current
    /// location with `replace`.
    pub fn refresh_triggered(&mut self) {
        if !self.options.pull_to_refresh_enabled {
            debug!(session_id = %self.id, "Pull-to-refresh disabled; ignoring");
            return;
        }

        self.notify(|adapter| adapter.reload_triggered_by_pull_to_refresh());

        if self.location.is_none() {
            self.with_progress(|progress| progress.stop_refreshing());
            return;
        }

        self.dispatch(VisitAction::Replace);
    }

    fn check_visit_preconditions(&self, location: &str) -> Result<()> {
        if self.bridge.is_none() {
            return Err(Error::precondition("a browser surface must be bound"));
        }
        if self.adapter.is_none() {
            return Err(Error::precondition("an adapter must be bound"));
        }
        if location.is_empty() {
            return Err(Error::precondition("location must not be empty"));
        }
        Ok(())
    }

    /// Routes the current location down the path the state allows.
    pub(super) fn dispatch(&mut self, action: VisitAction) {
        let Some(location) = self.location.clone() else {
            return;
        };

        if self.flags.ready() {
            self.pending_action = VisitAction::Advance;
            self.visit_location_with_action(&location, action);
        } else if !self.flags.cold_boot_in_progress() {
            self.pending_action = action;
            self.cold_boot(&location);
        } else {
            self.pending_action = action;
            debug!(location = %location, "Cold boot in progress; visit deferred until ready");
        }
    }

    /// Asks the running runtime to visit `location`.
    pub(super) fn visit_location_with_action(&mut self, location: &str, action: VisitAction) {
        let context = self.context.clone();
        let restoration_id = context.and_then(|context| self.restorations.get(&context));

        self.send(&BridgeCall::visit_location(
            location,
            action,
            restoration_id.as_ref(),
        ));
        self.arm_visit();
    }

    fn cold_boot(&mut self, location: &str) {
        self.flags.begin_cold_boot();
        self.arm_visit();

        let loaded = match self.bridge.as_ref() {
            Some(bridge) => bridge.load(location, &self.options.headers),
            None => false,
        };

        if !loaded {
            // Let the next visit start over with a fresh load.
            self.reset_to_cold_boot();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::identifiers::{ContextKey, RestorationId, VisitId};
    use crate::session::{Headers, SessionOptions, SessionState};
    use crate::testing::{
        AdapterEvent, ProgressEvent, RecordingAdapter, RecordingSurface, SurfaceCall, bound_core,
        ready_core,
    };

    #[test]
    fn test_visit_requires_surface_and_adapter() {
        let mut core = SessionCore::new();
        let err = core.visit("https://x/a").expect_err("no surface");
        assert!(err.is_precondition());

        core.bind_surface(RecordingSurface::new());
        let err = core.visit("https://x/a").expect_err("no adapter");
        assert!(err.is_precondition());

        core.bind_adapter(RecordingAdapter::new());
        let err = core.visit("").expect_err("empty location");
        assert!(err.is_precondition());
    }

    #[test]
    fn test_precondition_failure_dispatches_nothing() {
        let surface = RecordingSurface::new();
        let mut core = SessionCore::new();
        core.bind_surface(surface.clone());

        assert!(core.visit("https://x/a").is_err());
        assert!(surface.calls().is_empty());
        assert!(core.location().is_none());
    }

    #[test]
    fn test_cold_visit_loads_document_with_headers() {
        let options = SessionOptions::new().with_header("X-Client", "native");
        let (mut core, surface, _adapter, _progress) = bound_core(options);

        core.visit("https://x/a").expect("visit");

        let mut headers = Headers::new();
        headers.insert("X-Client".to_string(), "native".to_string());
        assert_eq!(
            surface.calls(),
            vec![SurfaceCall::Load {
                location: "https://x/a".to_string(),
                headers,
            }]
        );
        assert!(core.flags().cold_boot_in_progress());
        assert!(core.visit_in_flight());
    }

    #[test]
    fn test_visit_during_cold_boot_is_deferred() {
        let (mut core, surface, _adapter, _progress) = bound_core(SessionOptions::new());

        core.visit("https://x/a").expect("first visit");
        core.visit("https://x/b").expect("second visit");

        assert_eq!(surface.loads(), vec!["https://x/a".to_string()]);
        assert_eq!(core.location(), Some("https://x/b"));

        core.on_script_runtime_ready(true);
        assert_eq!(
            surface.scripts(),
            vec![
                r#"webView.visitLocationWithActionAndRestorationIdentifier("https%3A%2F%2Fx%2Fb","advance",null)"#
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_ready_visit_uses_bridge_call() {
        let (mut core, surface, _adapter, _progress) = ready_core();

        core.visit("https://x/b").expect("visit");

        assert_eq!(
            surface.scripts(),
            vec![
                r#"webView.visitLocationWithActionAndRestorationIdentifier("https%3A%2F%2Fx%2Fb","advance",null)"#
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_ready_visit_sends_cached_restoration_id() {
        let (mut core, surface, _adapter, _progress) = ready_core();
        core.bind_context(ContextKey::new("screen"));
        core.restorations
            .insert(ContextKey::new("screen"), RestorationId::new("r1"));
        surface.clear();

        core.visit(VisitRequest::new("https://x/c").action(VisitAction::Replace))
            .expect("visit");

        assert_eq!(
            surface.scripts(),
            vec![
                r#"webView.visitLocationWithActionAndRestorationIdentifier("https%3A%2F%2Fx%2Fc","replace","r1")"#
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_restore_flag_applies_to_one_visit() {
        let (mut core, surface, _adapter, _progress) = ready_core();

        core.restore_with_cached_snapshot(true);
        core.visit("https://x/a").expect("restore visit");
        core.visit("https://x/b").expect("plain visit");

        let scripts = surface.scripts();
        assert!(scripts[0].contains(r#","restore","#));
        assert!(scripts[1].contains(r#","advance","#));
    }

    #[test]
    fn test_restore_flag_survives_precondition_failure() {
        let mut core = SessionCore::new();
        core.restore_with_cached_snapshot(true);
        assert!(core.visit("https://x/a").is_err());
        assert!(core.snapshot().restore_next_visit);
    }

    #[test]
    fn test_replace_existing_page_clears_history() {
        let (mut core, surface, _adapter, _progress) = ready_core();
        core.restore_with_cached_snapshot(true);

        core.replace_existing_page("https://x/r").expect("replace");

        let calls = surface.calls();
        assert!(matches!(&calls[0], SurfaceCall::Evaluate(script) if script.contains(r#","replace","#)));
        assert_eq!(calls[1], SurfaceCall::ClearHistory);
        assert!(!core.snapshot().restore_next_visit);
    }

    #[test]
    fn test_cold_boot_replays_pending_action() {
        let (mut core, surface, _adapter, _progress) = bound_core(SessionOptions::new());

        core.replace_existing_page("https://x/r").expect("replace");
        core.on_document_started("https://x/r");
        core.on_document_finished("https://x/r", false);
        core.on_script_runtime_ready(true);

        let scripts = surface.scripts();
        assert!(scripts.last().expect("revisit").contains(r#","replace","#));
        assert_eq!(core.state(), SessionState::Ready);
    }

    #[test]
    fn test_failed_load_allows_retry() {
        let (mut core, surface, _adapter, _progress) = bound_core(SessionOptions::new());
        surface.fail_all(true);

        core.visit("https://x/a").expect("visit");
        assert!(!core.flags().cold_boot_in_progress());
        assert!(!core.visit_in_flight());

        surface.fail_all(false);
        core.visit("https://x/a").expect("retry");
        assert_eq!(surface.calls().len(), 1);
    }

    #[test]
    fn test_refresh_triggered() {
        let options = SessionOptions::new().with_pull_to_refresh(true);
        let (mut core, surface, adapter, _progress) = bound_core(options);
        core.visit("https://x/a").expect("visit");
        core.on_script_runtime_ready(true);
        surface.clear();

        core.refresh_triggered();

        assert!(adapter.events().contains(&AdapterEvent::ReloadTriggeredByPullToRefresh));
        assert!(surface.scripts()[0].contains(r#","replace","#));
    }

    #[test]
    fn test_refresh_ignored_when_disabled() {
        let options = SessionOptions::new().with_pull_to_refresh(false);
        let (mut core, surface, adapter, _progress) = bound_core(options);
        core.visit("https://x/a").expect("visit");
        surface.clear();

        core.refresh_triggered();

        assert!(adapter.events().is_empty());
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn test_refresh_without_location_stops_spinner() {
        let options = SessionOptions::new().with_pull_to_refresh(true);
        let (mut core, _surface, _adapter, progress) = bound_core(options);

        core.refresh_triggered();

        assert_eq!(progress.events(), vec![ProgressEvent::StopRefreshing]);
    }

    #[test]
    fn test_started_visit_is_not_current_before_start() {
        let (mut core, _surface, _adapter, _progress) = ready_core();
        core.visit("https://x/a").expect("visit");
        assert!(core.current_visit_id().is_none());

        core.visit_started(VisitId::new("v1"), false);
        assert_eq!(core.current_visit_id(), Some(&VisitId::new("v1")));
    }

    proptest! {
        #[test]
        fn test_restore_only_affects_next_dispatch(
            flags in proptest::collection::vec(any::<bool>(), 1..12)
        ) {
            let (mut core, surface, _adapter, _progress) = ready_core();

            for restore in &flags {
                core.restore_with_cached_snapshot(*restore);
                core.visit("https://x/p").expect("visit");
            }

            let scripts = surface.scripts();
            prop_assert_eq!(scripts.len(), flags.len());
            for (script, restore) in scripts.iter().zip(&flags) {
                let expected = if *restore { r#","restore","# } else { r#","advance","# };
                prop_assert!(script.contains(expected));
            }
        }
    }
}
