//! Builder pattern for session construction.
//!
//! # Example
//!
//! ```ignore
//! let session = Session::builder()
//!     .options(SessionOptions::new().with_pull_to_refresh(true))
//!     .surface(surface)
//!     .adapter(adapter)
//!     .context("inbox")
//!     .spawn()?;
//!
//! session.visit("https://example.com/inbox").await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::identifiers::ContextKey;
use crate::transport::BrowserSurface;

use super::adapter::{ProgressIndicator, SessionAdapter};
use super::core::SessionCore;
use super::handle::SessionHandle;
use super::options::SessionOptions;

// ============================================================================
// Session
// ============================================================================

/// Entry point for creating sessions.
#[derive(Debug, Clone, Copy)]
pub struct Session;

impl Session {
    /// Creates a session builder.
    #[inline]
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }
}

// ============================================================================
// SessionBuilder
// ============================================================================

/// Builder for a [`SessionCore`] or a running [`SessionHandle`].
#[derive(Default)]
pub struct SessionBuilder {
    options: SessionOptions,
    surface: Option<Arc<dyn BrowserSurface>>,
    adapter: Option<Arc<dyn SessionAdapter>>,
    progress: Option<Arc<dyn ProgressIndicator>>,
    context: Option<ContextKey>,
}

impl fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("options", &self.options)
            .field("surface", &self.surface.is_some())
            .field("adapter", &self.adapter.is_some())
            .field("progress", &self.progress.is_some())
            .field("context", &self.context)
            .finish()
    }
}

impl SessionBuilder {
    /// Creates a builder with default options and no bindings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the session options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Binds the browser surface.
    #[inline]
    #[must_use]
    pub fn surface(mut self, surface: Arc<dyn BrowserSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Binds the host adapter.
    #[inline]
    #[must_use]
    pub fn adapter(mut self, adapter: Arc<dyn SessionAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Binds the progress indicator.
    #[inline]
    #[must_use]
    pub fn progress(mut self, progress: Arc<dyn ProgressIndicator>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Binds a host navigation context.
    #[inline]
    #[must_use]
    pub fn context(mut self, context: impl Into<ContextKey>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Builds a session core without starting an event loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the options are invalid.
    pub fn build(self) -> Result<SessionCore> {
        let mut core = SessionCore::with_options(self.options)?;

        if let Some(context) = self.context {
            core.bind_context(context);
        }
        if let Some(surface) = self.surface {
            core.bind_surface(surface);
        }
        if let Some(adapter) = self.adapter {
            core.bind_adapter(adapter);
        }
        if let Some(progress) = self.progress {
            core.bind_progress(progress);
        }

        Ok(core)
    }

    /// Builds the session and starts its event loop.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the options are invalid.
    pub fn spawn(self) -> Result<SessionHandle> {
        Ok(SessionHandle::spawn(self.build()?))
    }
}

// ============================================================================
// Tests
// ============================================================================
