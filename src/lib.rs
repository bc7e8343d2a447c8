//! Turbolinks session - native visit lifecycle for embedded browser surfaces.
//!
//! This library drives a single embedded browser surface in cooperation with
//! the Turbolinks script runtime loaded in its pages. It decides how each
//! navigation happens and follows every visit through its bridge events.
//!
//! # Architecture
//!
//! The session sits between the host application and the browser surface:
//!
//! - **Native side (Rust)**: Owns the visit state machine, issues bridge calls
//! - **Script side (page)**: Turbolinks controller behind the injected `webView` shim
//!
//! Key design principles:
//!
//! - Each [`SessionHandle`] owns one event loop; every event is serialized through it
//! - Cold boot (full document load) until the runtime confirms it is ready
//! - Visit ids are minted by the runtime; stale events are dropped, never applied
//! - Transport failures are logged and heal on the next cold boot
//!
//! # Quick Start
//!
//! ```ignore
//! use turbolinks_session::{Result, Session, SessionOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let session = Session::builder()
//!         .options(SessionOptions::new().with_header("X-Client", "native"))
//!         .surface(surface)
//!         .adapter(adapter)
//!         .context("inbox")
//!         .spawn()?;
//!
//!     session.visit("https://example.com/inbox").await?;
//!
//!     // Forward surface and bridge notifications from the host glue.
//!     session.document_started("https://example.com/inbox")?;
//!     session.document_finished("https://example.com/inbox")?;
//!     session.dispatch_json(r#"{"method":"onScriptRuntimeReady","args":[true]}"#)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Bridge calls and messages |
//! | [`session`] | Visit state machine and event loop |
//! | [`transport`] | Browser surface and bridge transport |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for session entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Bridge protocol types.
///
/// Native → script calls and script → native messages.
pub mod protocol;

/// Visit lifecycle state machine.
///
/// Use [`Session::builder()`] to create a session.
pub mod session;

/// Browser surface transport.
///
/// The [`BrowserSurface`] trait and the bridge call executor.
pub mod transport;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ContextKey, RestorationId, SessionId, VisitId};

// Protocol types
pub use protocol::{BridgeCall, BridgeFunction, BridgeMessage, BridgeValue, VisitAction};

// Session types
pub use session::{
    Headers, NavigationDecision, ProgressIndicator, Session, SessionAdapter, SessionBuilder,
    SessionCore, SessionHandle, SessionOptions, SessionSnapshot, SessionState, VisitRequest,
    default_session, reset_default,
};

// Transport types
pub use transport::{Bridge, BrowserSurface};
