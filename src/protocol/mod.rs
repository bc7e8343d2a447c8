//! Bridge protocol message types.
//!
//! This module defines the messages exchanged between the native session and
//! the script runtime running inside the browser surface.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `BridgeCall` | Native → Script | One-way function call on `webView` |
//! | `BridgeMessage` | Script → Native | Entry-point invocation on `TurbolinksNative` |
//!
//! There is no request/response framing. Visit events are correlated by the
//! runtime-minted visit id, and staleness is decided by the session.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `action` | Visit actions |
//! | `call` | Native → script calls |
//! | `message` | Script → native entry points |
//! | `value` | Closed tagged-value argument type |

// ============================================================================
// Submodules
// ============================================================================

/// Visit actions.
pub mod action;

/// Native → script calls.
pub mod call;

/// Script → native entry points.
pub mod message;

/// Bridge argument values.
pub mod value;

// ============================================================================
// Re-exports
// ============================================================================

pub use action::VisitAction;
pub use call::{BRIDGE_OBJECT, BridgeCall, BridgeFunction, encode_location};
pub use message::{BridgeMessage, NATIVE_INTERFACE_NAME};
pub use value::BridgeValue;
