use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a persisted signal. Signals start `active` and only
/// move forward; they are never deleted by the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    #[default]
    Active,
    Read,
    Archived,
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalStatus::Active => write!(f, "active"),
            SignalStatus::Read => write!(f, "read"),
            SignalStatus::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for SignalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(SignalStatus::Active),
            "read" => Ok(SignalStatus::Read),
            "archived" => Ok(SignalStatus::Archived),
            _ => Err(format!("Unknown signal status: {s}")),
        }
    }
}
