//! Native → script bridge calls.
//!
//! A [`BridgeCall`] is one-way: it names a function on the injected
//! `webView` bridge object and carries its arguments. Nothing comes back on
//! the same channel; results arrive later as separate
//! [`BridgeMessage`](super::BridgeMessage)s.
//!
//! # Functions
//!
//! | Function | Arguments |
//! |----------|-----------|
//! | `changeHistoryForVisit` | visitId |
//! | `issueRequestForVisit` | visitId |
//! | `loadCachedSnapshotForVisit` | visitId |
//! | `loadResponseForVisit` | visitId |
//! | `visitLocationWithActionAndRestorationIdentifier` | location, action, restorationId |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::error::Result;
use crate::identifiers::{RestorationId, VisitId};

use super::{BridgeValue, VisitAction};

// ============================================================================
// Constants
// ============================================================================

/// Global object the injected bridge script installs on the page.
pub const BRIDGE_OBJECT: &str = "webView";

// ============================================================================
// BridgeFunction
// ============================================================================

/// Script-side bridge functions the session may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeFunction {
    /// Push or replace the history entry for a started visit.
    ChangeHistoryForVisit,
    /// Issue the network request for a started visit.
    IssueRequestForVisit,
    /// Render the cached snapshot (if any) for a started visit.
    LoadCachedSnapshotForVisit,
    /// Render the response of a completed request.
    LoadResponseForVisit,
    /// Start a visit to a location.
    VisitLocationWithActionAndRestorationIdentifier,
}

impl BridgeFunction {
    /// Returns the function name on the bridge object.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ChangeHistoryForVisit => "changeHistoryForVisit",
            Self::IssueRequestForVisit => "issueRequestForVisit",
            Self::LoadCachedSnapshotForVisit => "loadCachedSnapshotForVisit",
            Self::LoadResponseForVisit => "loadResponseForVisit",
            Self::VisitLocationWithActionAndRestorationIdentifier => {
                "visitLocationWithActionAndRestorationIdentifier"
            }
        }
    }
}

impl fmt::Display for BridgeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// BridgeCall
// ============================================================================

/// A one-way call into the script runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeCall {
    /// Function to invoke.
    pub function: BridgeFunction,
    /// Arguments, in call order.
    pub args: Vec<BridgeValue>,
}

impl BridgeCall {
    /// Creates a call with explicit arguments.
    #[inline]
    #[must_use]
    pub fn new(function: BridgeFunction, args: Vec<BridgeValue>) -> Self {
        Self { function, args }
    }

    /// Creates a call whose single argument is a visit id.
    #[must_use]
    pub fn for_visit(function: BridgeFunction, visit_id: &VisitId) -> Self {
        Self::new(function, vec![BridgeValue::from(visit_id.as_str())])
    }

    /// `changeHistoryForVisit(visitId)`.
    #[inline]
    #[must_use]
    pub fn change_history(visit_id: &VisitId) -> Self {
        Self::for_visit(BridgeFunction::ChangeHistoryForVisit, visit_id)
    }

    /// `issueRequestForVisit(visitId)`.
    #[inline]
    #[must_use]
    pub fn issue_request(visit_id: &VisitId) -> Self {
        Self::for_visit(BridgeFunction::IssueRequestForVisit, visit_id)
    }

    /// `loadCachedSnapshotForVisit(visitId)`.
    #[inline]
    #[must_use]
    pub fn load_cached_snapshot(visit_id: &VisitId) -> Self {
        Self::for_visit(BridgeFunction::LoadCachedSnapshotForVisit, visit_id)
    }

    /// `loadResponseForVisit(visitId)`.
    #[inline]
    #[must_use]
    pub fn load_response(visit_id: &VisitId) -> Self {
        Self::for_visit(BridgeFunction::LoadResponseForVisit, visit_id)
    }

    /// `visitLocationWithActionAndRestorationIdentifier(location, action, restorationId)`.
    ///
    /// The location is URI-encoded; a missing restoration id is sent as `null`.
    #[must_use]
    pub fn visit_location(
        location: &str,
        action: VisitAction,
        restoration_id: Option<&RestorationId>,
    ) -> Self {
        Self::new(
            BridgeFunction::VisitLocationWithActionAndRestorationIdentifier,
            vec![
                BridgeValue::from(encode_location(location)),
                BridgeValue::from(action.as_str()),
                BridgeValue::from(restoration_id.map(RestorationId::as_str)),
            ],
        )
    }

    /// Renders the call as a script statement, e.g.
    /// `webView.loadResponseForVisit("v1")`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if an argument fails to encode.
    pub fn to_script(&self) -> Result<String> {
        let args = self
            .args
            .iter()
            .map(BridgeValue::encode)
            .collect::<Result<Vec<_>>>()?;

        Ok(format!(
            "{BRIDGE_OBJECT}.{}({})",
            self.function.name(),
            args.join(",")
        ))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// URI-encodes a location before it crosses the bridge.
#[must_use]
pub fn encode_location(location: &str) -> String {
    urlencoding::encode(location).into_owned()
}

// ============================================================================
// Tests
// ============================================================================
