//! Error types for the Turbolinks session.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use turbolinks_session::{Result, VisitRequest};
//!
//! async fn example(session: &SessionHandle) -> Result<()> {
//!     session.visit(VisitRequest::new("https://example.com/inbox")).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants | Surfaced to |
//! |----------|----------|-------------|
//! | Caller misuse | [`Error::Precondition`] | `visit()` caller |
//! | Configuration | [`Error::Config`] | configuring caller |
//! | Protocol | [`Error::Protocol`] | bridge glue (session state untouched) |
//! | Transport | [`Error::Transport`] | logged by the bridge, never propagated |
//! | Lifecycle | [`Error::SessionClosed`], [`Error::ChannelClosed`] | handle caller |
//! | External | [`Error::Json`] | bridge glue |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Caller Errors
    // ========================================================================
    /// A required binding was missing when a visit was requested.
    ///
    /// This is the only error a visit ever surfaces to its caller.
    #[error("Precondition failed: {requirement}")]
    Precondition {
        /// The missing requirement.
        requirement: String,
    },

    /// Invalid pass-through configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Malformed message from the script runtime.
    ///
    /// Unknown entry point, wrong arity or wrong argument type.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// The browser surface failed to execute a call.
    ///
    /// Raised by [`BrowserSurface`](crate::transport::BrowserSurface)
    /// implementations, e.g. when the surface was torn down mid-call.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// The session event loop is no longer running.
    #[error("Session closed")]
    SessionClosed,

    /// Reply channel dropped before an answer arrived.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a precondition error.
    #[inline]
    pub fn precondition(requirement: impl Into<String>) -> Self {
        Self::Precondition {
            requirement: requirement.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a caller precondition failure.
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }

    /// Returns `true` if the session can no longer accept work.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::SessionClosed | Self::ChannelClosed(_))
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Script-side and transport failures heal on the next cold boot.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Protocol { .. } | Self::Transport { .. } | Self::Json(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
