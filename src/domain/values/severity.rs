use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Urgency level of a finding or signal. The derived ordering follows the
/// declaration order: info < low < medium < high < critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Severities that qualify for outbound notification.
    pub fn is_notifiable(self) -> bool {
        self >= Severity::Medium
    }

    /// Emoji used when formatting notification messages.
    pub fn emoji(self) -> &'static str {
        match self {
            Severity::Info => "\u{2139}\u{FE0F}",
            Severity::Low => "\u{1F535}",
            Severity::Medium => "\u{1F7E1}",
            Severity::High => "\u{1F7E0}",
            Severity::Critical => "\u{1F534}",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("Unknown severity: {s}")),
        }
    }
}
