//! Price alert analyzer for active holdings.
//!
//! The three checks form an ordered decision tree per holding: a triggered
//! stop loss is terminal, a triggered take profit suppresses the move
//! check, so each holding yields at most one finding per cycle.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::domain::entities::holding::Holding;
use crate::domain::error::DomainError;
use crate::domain::ports::analyzer::{Analyzer, Finding};
use crate::domain::ports::holdings_ledger::HoldingsLedger;
use crate::domain::ports::market_data::MarketDataProvider;
use crate::domain::values::severity::Severity;

/// Fractional daily move that triggers a large-move alert.
const LARGE_MOVE_THRESHOLD: f64 = 0.05;

pub struct PriceAlertAnalyzer {
    ledger: Arc<dyn HoldingsLedger>,
    market: Arc<dyn MarketDataProvider>,
}

impl PriceAlertAnalyzer {
    pub fn new(ledger: Arc<dyn HoldingsLedger>, market: Arc<dyn MarketDataProvider>) -> Self {
        Self { ledger, market }
    }

    fn check_stop_loss(&self, holding: &Holding, current: f64) -> Option<Finding> {
        let stop_loss = holding.stop_loss_price?;
        if current > stop_loss {
            return None;
        }

        let loss_pct = pct_change(current, holding.avg_cost);
        Some(Finding {
            title: format!("STOP LOSS TRIGGERED: {}", holding.symbol),
            description: format!(
                "{} has hit stop loss at ${stop_loss:.2}. \
                 Current price: ${current:.2}. \
                 Your avg cost: ${:.2}. \
                 Position P/L: {loss_pct:.1}%. \
                 Consider executing stop loss order.",
                holding.symbol, holding.avg_cost
            ),
            severity: Severity::Critical,
            data: json!({
                "symbol": holding.symbol,
                "current_price": current,
                "stop_loss": stop_loss,
                "avg_cost": holding.avg_cost,
                "loss_pct": round2(loss_pct),
                "alert_type": "stop_loss",
            }),
            related_symbols: vec![holding.symbol.clone()],
            expires_at: None,
        })
    }

    fn check_take_profit(&self, holding: &Holding, current: f64) -> Option<Finding> {
        let take_profit = holding.take_profit_price?;
        if current < take_profit {
            return None;
        }

        let gain_pct = pct_change(current, holding.avg_cost);
        Some(Finding {
            title: format!("TAKE PROFIT REACHED: {}", holding.symbol),
            description: format!(
                "{} has reached take profit target at ${take_profit:.2}. \
                 Current price: ${current:.2}. \
                 Your avg cost: ${:.2}. \
                 Position gain: +{gain_pct:.1}%. \
                 Consider taking profits or adjusting target.",
                holding.symbol, holding.avg_cost
            ),
            severity: Severity::High,
            data: json!({
                "symbol": holding.symbol,
                "current_price": current,
                "take_profit": take_profit,
                "avg_cost": holding.avg_cost,
                "gain_pct": round2(gain_pct),
                "alert_type": "take_profit",
            }),
            related_symbols: vec![holding.symbol.clone()],
            expires_at: None,
        })
    }

    fn check_large_move(&self, holding: &Holding, current: f64, prev_close: f64) -> Option<Finding> {
        let change = (current - prev_close) / prev_close;
        if change.abs() < LARGE_MOVE_THRESHOLD {
            return None;
        }

        let direction = if change > 0.0 { "up" } else { "down" };
        Some(Finding {
            title: format!(
                "Large Move: {} {direction} {:.1}%",
                holding.symbol,
                change.abs() * 100.0
            ),
            description: format!(
                "{} moved {direction} {:.1}% today. \
                 Previous close: ${prev_close:.2}, Current: ${current:.2}. \
                 Review news and consider if position adjustment needed.",
                holding.symbol,
                change.abs() * 100.0
            ),
            severity: Severity::Medium,
            data: json!({
                "symbol": holding.symbol,
                "current_price": current,
                "prev_close": prev_close,
                "change_pct": round2(change * 100.0),
                "alert_type": "large_move",
            }),
            related_symbols: vec![holding.symbol.clone()],
            expires_at: None,
        })
    }
}

impl Analyzer for PriceAlertAnalyzer {
    fn name(&self) -> &'static str {
        "price_alert_analyzer"
    }

    fn sector(&self) -> &'static str {
        "price"
    }

    fn analyze(&self) -> Result<Vec<Finding>, DomainError> {
        let mut findings = Vec::new();

        for holding in self.ledger.active_holdings()? {
            let Some(quote) = self.market.latest_quote(&holding.symbol, holding.market)? else {
                debug!(symbol = %holding.symbol, "no quote available, skipping");
                continue;
            };
            let current = quote.close;

            // Stop loss is terminal priority for this holding and cycle.
            if let Some(finding) = self.check_stop_loss(&holding, current) {
                findings.push(finding);
                continue;
            }

            if let Some(finding) = self.check_take_profit(&holding, current) {
                findings.push(finding);
                continue;
            }

            if let Some(prev) = self.market.prior_close(&holding.symbol, holding.market)? {
                if prev.close > 0.0 {
                    findings.extend(self.check_large_move(&holding, current, prev.close));
                }
            }
        }

        Ok(findings)
    }
}

/// Signed percentage of `current` vs `base`: (current/base - 1) * 100.
fn pct_change(current: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        (current / base - 1.0) * 100.0
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
