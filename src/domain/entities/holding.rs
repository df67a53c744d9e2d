use crate::domain::values::market::Market;
use crate::domain::values::tier::Tier;
use serde::{Deserialize, Serialize};

/// An active position, as read from the holdings ledger. This pipeline
/// never writes holdings; position arithmetic lives with the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub id: i64,
    pub symbol: String,
    pub name: String,
    pub market: Market,
    pub tier: Tier,
    pub quantity: f64,
    pub avg_cost: f64,
    pub stop_loss_price: Option<f64>,
    pub take_profit_price: Option<f64>,
}

impl Holding {
    /// Cash rows participate in totals but have no market quote.
    pub fn is_cash(&self) -> bool {
        self.symbol == "CASH"
    }
}

/// A watchlist entry used by the opportunity scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchItem {
    pub symbol: String,
    pub name: String,
    pub market: Market,
    pub theme: Option<String>,
    pub target_price: Option<f64>,
}
