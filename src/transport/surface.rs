//! The browser surface collaborator.
//!
//! A [`BrowserSurface`] is the embedded browser view the session drives:
//! it loads documents, evaluates script, and answers the bridge probe.
//! Construction, rendering settings and threading of the real view belong
//! to the host; the session only needs this interface.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::identifiers::ContextKey;
use crate::session::Headers;

use super::assets::{BRIDGE_SCRIPT, RUNTIME_PROBE_SCRIPT, bridge_missing_from_probe};

// ============================================================================
// BrowserSurface
// ============================================================================

/// Embedded browser view bound to a session.
///
/// Every method may fail with [`Error::Transport`](crate::Error::Transport)
/// when the view has been torn down; the session logs and ignores those
/// failures.
#[async_trait]
pub trait BrowserSurface: Send + Sync {
    /// Performs a full document load.
    fn load_url(&self, location: &str, headers: &Headers) -> Result<()>;

    /// Evaluates a script without waiting for its result.
    fn evaluate_javascript(&self, script: &str) -> Result<()>;

    /// Evaluates a script and returns its JSON-encoded result.
    async fn evaluate_for_result(&self, script: &str) -> Result<String>;

    /// Returns `true` if the current document already carries the bridge.
    async fn is_bridge_present(&self) -> Result<bool> {
        let raw = self.evaluate_for_result(RUNTIME_PROBE_SCRIPT).await?;
        Ok(!bridge_missing_from_probe(&raw))
    }

    /// Installs the bridge shim into the current document.
    fn inject_bridge(&self) -> Result<()> {
        self.evaluate_javascript(BRIDGE_SCRIPT)
    }

    /// Drops the surface's back/forward history.
    fn clear_history(&self) {}

    /// Moves the surface to another host navigation context in place,
    /// keeping in-page script state alive.
    fn rebind_context(&self, _context: &ContextKey) {}

    /// Stores a cookie for `base_url`.
    fn set_cookie(&self, _base_url: &Url, _cookie: &str) -> Result<()> {
        Ok(())
    }

    /// Returns the current user-agent string, if the surface exposes one.
    fn user_agent(&self) -> Option<String> {
        None
    }

    /// Replaces the user-agent string.
    fn set_user_agent(&self, _user_agent: &str) -> Result<()> {
        Ok(())
    }
}
