//! Type-safe identifiers for session entities.
//!
//! Newtype wrappers keep visit ids, restoration ids and context keys from
//! being mixed up at compile time. Everything minted by the script runtime is
//! opaque to the native side: no format is assumed and no global uniqueness
//! is relied upon.
//!
//! | Type | Minted by | Meaning |
//! |------|-----------|---------|
//! | [`SessionId`] | native | Process-unique session number (logging) |
//! | [`VisitId`] | script runtime | One protocol-mediated navigation |
//! | [`RestorationId`] | script runtime | Scroll/snapshot restoration token |
//! | [`ContextKey`] | host | One host-side navigation context |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// SessionId
// ============================================================================

/// Counter backing [`SessionId::next`].
static NEXT_SESSION_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique session number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u32);

impl SessionId {
    /// Returns the next unused session id.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw number.
    #[inline]
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// VisitId
// ============================================================================

/// Opaque identifier of a visit, minted by the script runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitId(String);

impl VisitId {
    /// Wraps a runtime-supplied identifier.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VisitId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// RestorationId
// ============================================================================

/// Opaque restoration token supplied on visit completion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestorationId(String);

impl RestorationId {
    /// Wraps a runtime-supplied restoration token.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the token as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RestorationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RestorationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// ContextKey
// ============================================================================

/// Key of a host-side navigation context (one screen instance).
///
/// Restoration identifiers are cached per context key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextKey(String);

impl ContextKey {
    /// Creates a context key.
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContextKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_increase() {
        let first = SessionId::next();
        let second = SessionId::next();
        assert!(second.as_u32() > first.as_u32());
    }

    #[test]
    fn test_visit_id_is_opaque() {
        let id = VisitId::new("0e1f-visit");
        assert_eq!(id.as_str(), "0e1f-visit");
        assert_eq!(id.to_string(), "0e1f-visit");
        assert_eq!(id, VisitId::from("0e1f-visit"));
    }

    #[test]
    fn test_visit_id_serializes_transparently() {
        let id = VisitId::new("v1");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "\"v1\"");
    }

    #[test]
    fn test_context_key_ordering() {
        assert!(ContextKey::new("a") < ContextKey::new("b"));
    }
}
