//! Visit lifecycle state machine and its event loop.
//!
//! A session decides, for every visit, whether the script runtime can route
//! it (bridge call) or whether the surface must perform a full document load
//! (cold boot). It then follows the visit through its bridge events.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | `SessionCore` struct, bindings, configuration, accessors |
//! | `visit` | Visit dispatch, replace, pull-to-refresh |
//! | `events` | Script → native entry points, visit timeout |
//! | `lifecycle` | Document start/finish, load errors, navigation interception |
//! | `state` | Readiness flags |
//! | `registry` | Live visit id |
//! | `restoration` | Restoration id LRU cache |
//! | `options` | Configuration |
//! | `adapter` | Host callback traits |
//! | `builder` | `Session::builder()` |
//! | `handle` | Event loop and `SessionHandle` |
//! | `shared` | Opt-in process-wide default session |
//!
//! # Example
//!
//! ```ignore
//! let session = Session::builder()
//!     .surface(surface)
//!     .adapter(adapter)
//!     .spawn()?;
//!
//! // Cold boot: full document load.
//! session.visit("https://example.com/inbox").await?;
//!
//! // Surface glue.
//! session.document_started("https://example.com/inbox")?;
//! session.document_finished("https://example.com/inbox")?;
//!
//! // Bridge glue.
//! session.dispatch_json(r#"{"method":"onScriptRuntimeReady","args":[true]}"#)?;
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod adapter;
mod builder;
mod core;
mod events;
mod handle;
mod lifecycle;
mod options;
mod registry;
mod restoration;
mod shared;
mod state;
mod visit;

// ============================================================================
// Re-exports
// ============================================================================

pub use adapter::{ProgressIndicator, SessionAdapter};
pub use builder::{Session, SessionBuilder};
pub use core::{SessionCore, SessionSnapshot};
pub use events::{RUNTIME_NOT_READY_STATUS, VISIT_TIMEOUT_STATUS};
pub use handle::SessionHandle;
pub use lifecycle::NavigationDecision;
pub use options::{
    DEFAULT_RESTORATION_CAPACITY, DEFAULT_VISIT_TIMEOUT, Headers, MIN_FALLBACK_DEBOUNCE,
    SessionOptions,
};
pub use registry::VisitRegistry;
pub use restoration::RestorationCache;
pub use shared::{default_session, reset_default};
pub use state::{SessionFlags, SessionState};
pub use visit::VisitRequest;
