//! Visit actions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Navigation semantics requested for a visit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitAction {
    /// Push a new entry onto the history stack.
    #[default]
    Advance,
    /// Replace the current history entry.
    Replace,
    /// Restore a previous entry from its cached snapshot.
    Restore,
    /// Reload the current entry.
    Reload,
}

impl VisitAction {
    /// Returns the wire name of the action.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Advance => "advance",
            Self::Replace => "replace",
            Self::Restore => "restore",
            Self::Reload => "reload",
        }
    }
}

impl fmt::Display for VisitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "advance" => Ok(Self::Advance),
            "replace" => Ok(Self::Replace),
            "restore" => Ok(Self::Restore),
            "reload" => Ok(Self::Reload),
            other => Err(Error::protocol(format!("Unknown visit action: {other}"))),
        }
    }
}
