use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Portfolio allocation bucket, used by drift and risk checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Stable,
    Medium,
    Gamble,
}

impl Tier {
    /// Target portfolio weight for this tier, in percent.
    pub fn target_pct(self) -> f64 {
        match self {
            Tier::Stable => 50.0,
            Tier::Medium => 30.0,
            Tier::Gamble => 20.0,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Stable => write!(f, "stable"),
            Tier::Medium => write!(f, "medium"),
            Tier::Gamble => write!(f, "gamble"),
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stable" => Ok(Tier::Stable),
            "medium" => Ok(Tier::Medium),
            "gamble" => Ok(Tier::Gamble),
            _ => Err(format!("Unknown tier: {s}")),
        }
    }
}
