//! Static scripts evaluated inside the browser surface.
//!
//! # Injection Flow
//!
//! 1. A document finishes loading
//! 2. The session probes for the bridge with [`RUNTIME_PROBE_SCRIPT`]
//! 3. If absent, [`BRIDGE_SCRIPT`] is evaluated once for that document
//! 4. The script installs `window.webView` over `Turbolinks.controller`
//! 5. It reports `onScriptRuntimeReady` or `onScriptRuntimeAbsent` back
//!    through the `TurbolinksNative` interface

// ============================================================================
// Constants
// ============================================================================

/// Expression that evaluates to `true` when the bridge is not installed yet.
pub const RUNTIME_PROBE_SCRIPT: &str = "window.webView == null";

/// The bridge shim installed on every new document.
///
/// Idempotent: it returns early when `window.webView` already exists.
pub const BRIDGE_SCRIPT: &str = include_str!("bridge.js");

// ============================================================================
// Helper Functions
// ============================================================================

/// Interprets the raw result of evaluating [`RUNTIME_PROBE_SCRIPT`].
///
/// Surfaces return evaluation results as JSON text. Anything other than a
/// literal `true` means the bridge is considered present, so an unreadable
/// probe never triggers a second injection.
#[must_use]
pub fn bridge_missing_from_probe(raw: &str) -> bool {
    serde_json::from_str::<bool>(raw.trim()).unwrap_or(false)
}

// ============================================================================
// Tests
// ============================================================================
