//! Script → native bridge messages.
//!
//! The script runtime invokes a fixed set of entry points on the native
//! interface. Host glue hands each invocation to the session either already
//! typed ([`BridgeMessage`]) or as a JSON envelope:
//!
//! ```json
//! { "method": "visitStarted", "args": ["v1", false] }
//! ```
//!
//! # Entry Points
//!
//! | Entry point | Args |
//! |-------------|------|
//! | `visitProposedToLocationWithAction` | location, action |
//! | `visitStarted` | visitId, hasCachedSnapshot |
//! | `visitRequestCompleted` | visitId |
//! | `visitRequestFailedWithStatusCode` | visitId, statusCode |
//! | `visitRendered` | visitId |
//! | `visitCompleted` | visitId, restorationId |
//! | `onScriptRuntimeReady` | isReady |
//! | `onScriptRuntimeAbsent` | none |
//! | `onPageInvalidated` | none |
//!
//! Legacy bridge scripts use `setTurbolinksIsReady`, `turbolinksDoesNotExist`
//! and `pageInvalidated`; those names are accepted as aliases.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::identifiers::{RestorationId, VisitId};

use super::{BridgeValue, VisitAction};

// ============================================================================
// Constants
// ============================================================================

/// Name under which the native interface is exposed to the page.
pub const NATIVE_INTERFACE_NAME: &str = "TurbolinksNative";

// ============================================================================
// BridgeEnvelope
// ============================================================================

/// Wire form of an entry-point invocation.
#[derive(Debug, Clone, Deserialize)]
struct BridgeEnvelope {
    /// Entry point name.
    method: String,
    /// Positional arguments.
    #[serde(default)]
    args: Vec<BridgeValue>,
}

// ============================================================================
// BridgeMessage
// ============================================================================

/// A typed entry-point invocation from the script runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeMessage {
    /// A link inside the page proposes a visit; routed to the host.
    VisitProposedToLocationWithAction {
        /// Proposed location.
        location: String,
        /// Proposed action.
        action: VisitAction,
    },

    /// A visit started; the only event that replaces the live visit id.
    VisitStarted {
        /// Runtime-minted visit id.
        visit_id: VisitId,
        /// Whether a cached snapshot exists for the location.
        has_cached_snapshot: bool,
    },

    /// The visit's network request completed.
    VisitRequestCompleted {
        /// Visit id.
        visit_id: VisitId,
    },

    /// The visit's network request failed.
    VisitRequestFailedWithStatusCode {
        /// Visit id.
        visit_id: VisitId,
        /// HTTP status, or a non-positive runtime failure code.
        status_code: i32,
    },

    /// The visit's response (or snapshot) was rendered.
    VisitRendered {
        /// Visit id.
        visit_id: VisitId,
    },

    /// The visit completed.
    VisitCompleted {
        /// Visit id.
        visit_id: VisitId,
        /// Restoration token for the page just shown.
        restoration_id: RestorationId,
    },

    /// The runtime finished booting (or failed to).
    ScriptRuntimeReady {
        /// `true` when the runtime is usable.
        is_ready: bool,
    },

    /// The page does not support the protocol.
    ScriptRuntimeAbsent,

    /// New resources were detected; the page needs a full reload.
    PageInvalidated,
}

impl BridgeMessage {
    /// Parses a JSON envelope.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the text is not a valid envelope
    /// - [`Error::Protocol`] if the entry point or its arguments are invalid
    pub fn from_json(text: &str) -> Result<Self> {
        let envelope: BridgeEnvelope = serde_json::from_str(text)?;
        Self::from_call(&envelope.method, &envelope.args)
    }

    /// Builds a message from an entry-point name and positional arguments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] for unknown entry points, missing
    /// arguments, or arguments of the wrong type.
    pub fn from_call(method: &str, args: &[BridgeValue]) -> Result<Self> {
        let args = Args { method, args };

        let message = match method {
            "visitProposedToLocationWithAction" => Self::VisitProposedToLocationWithAction {
                location: args.string(0)?,
                action: args.string(1)?.parse()?,
            },

            "visitStarted" => Self::VisitStarted {
                visit_id: args.visit_id(0)?,
                has_cached_snapshot: args.optional_bool(1)?.unwrap_or(false),
            },

            "visitRequestCompleted" => Self::VisitRequestCompleted {
                visit_id: args.visit_id(0)?,
            },

            "visitRequestFailedWithStatusCode" => Self::VisitRequestFailedWithStatusCode {
                visit_id: args.visit_id(0)?,
                status_code: args.status_code(1)?,
            },

            "visitRendered" => Self::VisitRendered {
                visit_id: args.visit_id(0)?,
            },

            "visitCompleted" => Self::VisitCompleted {
                visit_id: args.visit_id(0)?,
                restoration_id: RestorationId::new(args.string(1)?),
            },

            "onScriptRuntimeReady" | "setTurbolinksIsReady" => Self::ScriptRuntimeReady {
                is_ready: args.bool(0)?,
            },

            "onScriptRuntimeAbsent" | "turbolinksDoesNotExist" => Self::ScriptRuntimeAbsent,

            "onPageInvalidated" | "pageInvalidated" => Self::PageInvalidated,

            other => return Err(Error::protocol(format!("Unknown entry point: {other}"))),
        };

        Ok(message)
    }

    /// Returns the canonical entry-point name.
    #[must_use]
    pub const fn entry_point(&self) -> &'static str {
        match self {
            Self::VisitProposedToLocationWithAction { .. } => "visitProposedToLocationWithAction",
            Self::VisitStarted { .. } => "visitStarted",
            Self::VisitRequestCompleted { .. } => "visitRequestCompleted",
            Self::VisitRequestFailedWithStatusCode { .. } => "visitRequestFailedWithStatusCode",
            Self::VisitRendered { .. } => "visitRendered",
            Self::VisitCompleted { .. } => "visitCompleted",
            Self::ScriptRuntimeReady { .. } => "onScriptRuntimeReady",
            Self::ScriptRuntimeAbsent => "onScriptRuntimeAbsent",
            Self::PageInvalidated => "onPageInvalidated",
        }
    }

    /// Returns the visit id this message refers to, if any.
    #[must_use]
    pub fn visit_id(&self) -> Option<&VisitId> {
        match self {
            Self::VisitStarted { visit_id, .. }
            | Self::VisitRequestCompleted { visit_id }
            | Self::VisitRequestFailedWithStatusCode { visit_id, .. }
            | Self::VisitRendered { visit_id }
            | Self::VisitCompleted { visit_id, .. } => Some(visit_id),
            _ => None,
        }
    }
}

// ============================================================================
// Argument Access
// ============================================================================

/// Positional argument reader with entry-point aware errors.
struct Args<'a> {
    method: &'a str,
    args: &'a [BridgeValue],
}

impl Args<'_> {
    fn get(&self, index: usize) -> Result<&BridgeValue> {
        self.args.get(index).ok_or_else(|| {
            Error::protocol(format!("{}: missing argument {index}", self.method))
        })
    }

    fn mismatch(&self, index: usize, expected: &str) -> Error {
        Error::protocol(format!(
            "{}: argument {index} is not a {expected}",
            self.method
        ))
    }

    fn string(&self, index: usize) -> Result<String> {
        self.get(index)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(index, "string"))
    }

    fn visit_id(&self, index: usize) -> Result<VisitId> {
        self.string(index).map(VisitId::new)
    }

    fn bool(&self, index: usize) -> Result<bool> {
        self.get(index)?
            .as_bool()
            .ok_or_else(|| self.mismatch(index, "boolean"))
    }

    fn optional_bool(&self, index: usize) -> Result<Option<bool>> {
        match self.args.get(index) {
            None | Some(BridgeValue::Null) => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| self.mismatch(index, "boolean")),
        }
    }

    fn status_code(&self, index: usize) -> Result<i32> {
        self.get(index)?
            .as_i64()
            .and_then(|code| i32::try_from(code).ok())
            .ok_or_else(|| self.mismatch(index, "status code"))
    }
}

// ============================================================================
// Tests
// ============================================================================
