//! Closed tagged-value type for bridge arguments.
//!
//! Every argument crossing the bridge, in either direction, is a
//! [`BridgeValue`]. Encoding to JSON happens in exactly one place,
//! [`BridgeValue::encode`].

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::error::Result;

// ============================================================================
// BridgeValue
// ============================================================================

/// A JSON-representable bridge argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BridgeValue {
    /// `null`.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// Any JSON number.
    Number(Number),
    /// A string.
    String(String),
    /// An ordered sequence.
    Array(Vec<BridgeValue>),
    /// A string-keyed object.
    Object(BTreeMap<String, BridgeValue>),
}

impl BridgeValue {
    /// Encodes the value as a JSON literal usable inside a script call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Returns the string payload, if any.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean payload.
    ///
    /// Accepts the strings `"true"`/`"false"` as well, since some runtimes
    /// stringify booleans on the way through the interface.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Returns the payload as a signed integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            Self::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Returns `true` for [`BridgeValue::Null`].
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for BridgeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for BridgeValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<String> for BridgeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for BridgeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl<T: Into<BridgeValue>> From<Option<T>> for BridgeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<BridgeValue>> From<Vec<T>> for BridgeValue {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
