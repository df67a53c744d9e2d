use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse category of a persisted signal, set from the producing
/// analyzer's domain rather than the analyzer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    Sector,
    Price,
    Macro,
    SmartMoney,
    Holding,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalType::Sector => write!(f, "sector"),
            SignalType::Price => write!(f, "price"),
            SignalType::Macro => write!(f, "macro"),
            SignalType::SmartMoney => write!(f, "smart_money"),
            SignalType::Holding => write!(f, "holding"),
        }
    }
}

impl FromStr for SignalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sector" => Ok(SignalType::Sector),
            "price" => Ok(SignalType::Price),
            "macro" => Ok(SignalType::Macro),
            "smart_money" => Ok(SignalType::SmartMoney),
            "holding" => Ok(SignalType::Holding),
            _ => Err(format!("Unknown signal type: {s}")),
        }
    }
}
