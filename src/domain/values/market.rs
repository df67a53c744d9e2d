use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exchange grouping for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "HK")]
    Hk,
    #[serde(rename = "CN")]
    Cn,
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::Us => write!(f, "US"),
            Market::Hk => write!(f, "HK"),
            Market::Cn => write!(f, "CN"),
        }
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "US" => Ok(Market::Us),
            "HK" => Ok(Market::Hk),
            "CN" => Ok(Market::Cn),
            _ => Err(format!("Unknown market: {s}")),
        }
    }
}
