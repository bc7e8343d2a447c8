//! Fire-and-forget execution of bridge calls.
//!
//! [`Bridge`] wraps the bound [`BrowserSurface`] and is the single place
//! where calls are rendered to script and handed to the surface. A surface
//! failure (typically a view torn down mid-call) is logged and swallowed:
//! nothing on this path ever propagates into the state machine.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::protocol::BridgeCall;
use crate::session::Headers;

use super::BrowserSurface;

// ============================================================================
// Bridge
// ============================================================================

/// Bridge transport over a bound browser surface.
#[derive(Clone)]
pub struct Bridge {
    surface: Arc<dyn BrowserSurface>,
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge").finish_non_exhaustive()
    }
}

impl Bridge {
    /// Creates a bridge over `surface`.
    #[inline]
    #[must_use]
    pub fn new(surface: Arc<dyn BrowserSurface>) -> Self {
        Self { surface }
    }

    /// Returns the underlying surface.
    #[inline]
    #[must_use]
    pub fn surface(&self) -> &Arc<dyn BrowserSurface> {
        &self.surface
    }

    /// Sends a call to the script runtime.
    ///
    /// Returns `false` if the call could not be delivered.
    pub fn call(&self, call: &BridgeCall) -> bool {
        let script = match call.to_script() {
            Ok(script) => script,
            Err(e) => {
                warn!(function = %call.function, error = %e, "Failed to encode bridge call");
                return false;
            }
        };

        match self.surface.evaluate_javascript(&script) {
            Ok(()) => {
                trace!(function = %call.function, "Bridge call sent");
                true
            }
            Err(e) => {
                warn!(function = %call.function, error = %e, "Bridge call failed");
                false
            }
        }
    }

    /// Performs a full document load.
    ///
    /// Returns `false` if the surface rejected the load.
    pub fn load(&self, location: &str, headers: &Headers) -> bool {
        debug!(location = %location, header_count = headers.len(), "Loading document");

        match self.surface.load_url(location, headers) {
            Ok(()) => true,
            Err(e) => {
                warn!(location = %location, error = %e, "Document load failed");
                false
            }
        }
    }

    /// Installs the bridge shim into the current document.
    ///
    /// Returns `false` if the surface rejected the script.
    pub fn inject(&self) -> bool {
        match self.surface.inject_bridge() {
            Ok(()) => {
                debug!("Bridge injection attempted");
                true
            }
            Err(e) => {
                warn!(error = %e, "Bridge injection failed");
                false
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
