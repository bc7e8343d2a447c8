//! Session configuration.
//!
//! Pass-through state consumed by the session: headers sent with cold-boot
//! loads, the user-agent override, and the few knobs that shape the visit
//! lifecycle (timeout, restoration cache size, fallback debounce).
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use turbolinks_session::SessionOptions;
//!
//! let options = SessionOptions::new()
//!     .with_header("X-Client", "android")
//!     .with_visit_timeout(Duration::from_secs(10))
//!     .with_restoration_capacity(16);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use indexmap::IndexMap;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default time a dispatched visit may stay in flight.
pub const DEFAULT_VISIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of navigation contexts with a cached restoration id.
pub const DEFAULT_RESTORATION_CAPACITY: usize = 64;

/// Shortest allowed window between two reported navigation interceptions.
pub const MIN_FALLBACK_DEBOUNCE: Duration = Duration::from_millis(500);

// ============================================================================
// Types
// ============================================================================

/// Ordered custom headers sent with every cold-boot load.
pub type Headers = IndexMap<String, String>;

// ============================================================================
// SessionOptions
// ============================================================================

/// Session configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Headers attached to full document loads.
    pub headers: Headers,

    /// User-agent override applied when a surface is bound.
    pub user_agent: Option<String>,

    /// Whether the host captures screenshots between pages.
    pub screenshots_enabled: bool,

    /// Whether pull-to-refresh reloads are honoured.
    pub pull_to_refresh_enabled: bool,

    /// Maximum time a visit may stay in flight; `None` disables the timer.
    pub visit_timeout: Option<Duration>,

    /// Capacity of the restoration cache.
    pub restoration_capacity: usize,

    /// Window in which repeated navigation interceptions are not reported again.
    pub fallback_debounce: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl SessionOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            headers: Headers::new(),
            user_agent: None,
            screenshots_enabled: true,
            pull_to_refresh_enabled: true,
            visit_timeout: Some(DEFAULT_VISIT_TIMEOUT),
            restoration_capacity: DEFAULT_RESTORATION_CAPACITY,
            fallback_debounce: MIN_FALLBACK_DEBOUNCE,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl SessionOptions {
    /// Adds a custom header.
    #[inline]
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the user-agent override.
    #[inline]
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Enables or disables screenshots.
    #[inline]
    #[must_use]
    pub fn with_screenshots(mut self, enabled: bool) -> Self {
        self.screenshots_enabled = enabled;
        self
    }

    /// Enables or disables pull-to-refresh.
    #[inline]
    #[must_use]
    pub fn with_pull_to_refresh(mut self, enabled: bool) -> Self {
        self.pull_to_refresh_enabled = enabled;
        self
    }

    /// Sets the in-flight visit timeout.
    #[inline]
    #[must_use]
    pub fn with_visit_timeout(mut self, timeout: Duration) -> Self {
        self.visit_timeout = Some(timeout);
        self
    }

    /// Disables the in-flight visit timeout.
    #[inline]
    #[must_use]
    pub fn without_visit_timeout(mut self) -> Self {
        self.visit_timeout = None;
        self
    }

    /// Sets the restoration cache capacity.
    #[inline]
    #[must_use]
    pub fn with_restoration_capacity(mut self, capacity: usize) -> Self {
        self.restoration_capacity = capacity;
        self
    }

    /// Sets the navigation interception debounce window.
    #[inline]
    #[must_use]
    pub fn with_fallback_debounce(mut self, window: Duration) -> Self {
        self.fallback_debounce = window;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl SessionOptions {
    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the restoration capacity is zero, the
    /// visit timeout is zero, or the debounce window is shorter than 500ms.
    pub fn validate(&self) -> Result<()> {
        if self.restoration_capacity == 0 {
            return Err(Error::config("Restoration capacity must be greater than zero"));
        }

        if self.visit_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(Error::config("Visit timeout must be greater than zero"));
        }

        if self.fallback_debounce < MIN_FALLBACK_DEBOUNCE {
            return Err(Error::config(format!(
                "Fallback debounce must be at least {}ms",
                MIN_FALLBACK_DEBOUNCE.as_millis()
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
