//! Session readiness flags and the state they encode.
//!
//! ```text
//!   ColdBootPending ──document finished──► Injecting ──runtime ready──► Ready
//!         ▲                                    │                          │
//!         └────────── any failure / reset ─────┴──────────────────────────┘
//! ```
//!
//! `ready` and `cold_boot_in_progress` are never both set. Every transition
//! goes through one of the methods below, which keep that invariant.

use std::fmt;

// ============================================================================
// SessionState
// ============================================================================

/// Observable protocol state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No usable runtime; the next visit performs a full document load.
    ColdBootPending,
    /// The bridge was injected and confirmation is outstanding.
    Injecting,
    /// The runtime confirmed it is present and initialised.
    Ready,
}

impl SessionState {
    /// Returns the state name used in logs.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ColdBootPending => "cold_boot_pending",
            Self::Injecting => "injecting",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SessionFlags
// ============================================================================

/// The raw readiness flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlags {
    ready: bool,
    cold_boot_in_progress: bool,
    bridge_injection_in_progress: bool,
}

impl SessionFlags {
    /// Flags of a freshly created session.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ready: false,
            cold_boot_in_progress: false,
            bridge_injection_in_progress: false,
        }
    }

    /// Runtime confirmed present.
    #[inline]
    #[must_use]
    pub const fn ready(&self) -> bool {
        self.ready
    }

    /// A full document load is under way.
    #[inline]
    #[must_use]
    pub const fn cold_boot_in_progress(&self) -> bool {
        self.cold_boot_in_progress
    }

    /// The bridge was injected and has not confirmed or denied yet.
    #[inline]
    #[must_use]
    pub const fn bridge_injection_in_progress(&self) -> bool {
        self.bridge_injection_in_progress
    }

    /// Derives the observable state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        if self.ready {
            SessionState::Ready
        } else if self.bridge_injection_in_progress {
            SessionState::Injecting
        } else {
            SessionState::ColdBootPending
        }
    }

    /// A new document started loading; it carries no runtime yet.
    pub fn begin_cold_boot(&mut self) {
        self.ready = false;
        self.bridge_injection_in_progress = false;
        self.cold_boot_in_progress = true;
    }

    /// The bridge shim was handed to the surface.
    pub fn begin_injection(&mut self) {
        self.bridge_injection_in_progress = true;
    }

    /// The runtime confirmed it is ready.
    pub fn mark_ready(&mut self) {
        self.bridge_injection_in_progress = false;
        self.cold_boot_in_progress = false;
        self.ready = true;
    }

    /// Collapses back to [`SessionState::ColdBootPending`].
    pub fn reset_to_cold_boot(&mut self) {
        *self = Self::new();
    }
}

// ============================================================================
// Tests
// ============================================================================
