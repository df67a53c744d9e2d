//! Precious metals analyzer (gold & silver).
//!
//! Watches the gold/silver ratio and the real-yield backdrop for gold. The
//! ratio band 65–85 is explicitly neutral: no finding is emitted inside it.
//! The two checks are independent and may both fire in one cycle.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::ports::analyzer::{Analyzer, Finding};
use crate::domain::ports::macro_data::MacroDataProvider;
use crate::domain::ports::market_data::MarketDataProvider;
use crate::domain::values::market::Market;
use crate::domain::values::severity::Severity;

/// Silver undervalued when the ratio is above this.
const RATIO_HIGH: f64 = 85.0;
/// Silver overvalued when the ratio is below this.
const RATIO_LOW: f64 = 65.0;
/// Gold bullish when the real yield is under 1%.
const REAL_YIELD_BULLISH: f64 = 1.0;
/// Gold very bullish when the real yield is negative.
const REAL_YIELD_VERY_BULLISH: f64 = 0.0;

/// GLD tracks roughly a tenth of an ounce of gold.
const GLD_OUNCE_FACTOR: f64 = 10.0;

pub struct PreciousMetalsAnalyzer {
    market: Arc<dyn MarketDataProvider>,
    macros: Arc<dyn MacroDataProvider>,
}

impl PreciousMetalsAnalyzer {
    pub fn new(market: Arc<dyn MarketDataProvider>, macros: Arc<dyn MacroDataProvider>) -> Self {
        Self { market, macros }
    }

    /// Spot gold proxy via the GLD ETF.
    fn gold_price(&self) -> Result<Option<f64>, DomainError> {
        Ok(self
            .market
            .latest_quote("GLD", Market::Us)?
            .map(|q| q.close * GLD_OUNCE_FACTOR))
    }

    /// Spot silver proxy via the SLV ETF (~1 oz per share).
    fn silver_price(&self) -> Result<Option<f64>, DomainError> {
        Ok(self.market.latest_quote("SLV", Market::Us)?.map(|q| q.close))
    }

    fn ratio_finding(&self, ratio: f64, gold: f64, silver: f64) -> Option<Finding> {
        if ratio > RATIO_HIGH {
            Some(Finding {
                title: "Silver Undervalued - High Gold/Silver Ratio".to_string(),
                description: format!(
                    "Gold/Silver ratio at {ratio:.1} (threshold: >{RATIO_HIGH:.0}). \
                     Historically high ratio suggests silver is undervalued relative to gold. \
                     Gold: ${gold:.2}, Silver: ${silver:.2}. \
                     Consider adding silver exposure (SLV) or rotating from gold to silver."
                ),
                severity: Severity::Medium,
                data: json!({
                    "gold_silver_ratio": round2(ratio),
                    "gold_price": round2(gold),
                    "silver_price": round2(silver),
                    "signal": "silver_undervalued",
                }),
                related_symbols: vec!["SLV".into(), "GLD".into()],
                expires_at: None,
            })
        } else if ratio < RATIO_LOW {
            Some(Finding {
                title: "Silver Overvalued - Low Gold/Silver Ratio".to_string(),
                description: format!(
                    "Gold/Silver ratio at {ratio:.1} (threshold: <{RATIO_LOW:.0}). \
                     Historically low ratio suggests silver may be overvalued. \
                     Gold: ${gold:.2}, Silver: ${silver:.2}. \
                     Consider reducing silver exposure or rotating to gold."
                ),
                severity: Severity::Low,
                data: json!({
                    "gold_silver_ratio": round2(ratio),
                    "gold_price": round2(gold),
                    "silver_price": round2(silver),
                    "signal": "silver_overvalued",
                }),
                related_symbols: vec!["SLV".into(), "GLD".into()],
                expires_at: None,
            })
        } else {
            None
        }
    }

    fn real_yield_finding(&self, real_yield: f64) -> Option<Finding> {
        if real_yield < REAL_YIELD_VERY_BULLISH {
            Some(Finding {
                title: "Negative Real Yields - Very Bullish for Gold".to_string(),
                description: format!(
                    "10-Year real yield at {real_yield:.2}% (negative real rates). \
                     Negative real interest rates are historically very bullish for gold \
                     as the opportunity cost of holding gold is negative. \
                     Consider increasing gold exposure."
                ),
                severity: Severity::High,
                data: json!({
                    "real_yield": round2(real_yield),
                    "signal": "very_bullish_gold",
                }),
                related_symbols: vec!["GLD".into(), "IAU".into()],
                expires_at: None,
            })
        } else if real_yield < REAL_YIELD_BULLISH {
            Some(Finding {
                title: "Low Real Yields - Bullish for Gold".to_string(),
                description: format!(
                    "10-Year real yield at {real_yield:.2}% (below {REAL_YIELD_BULLISH:.1}%). \
                     Low real interest rates support gold prices. \
                     Maintain or consider adding gold exposure."
                ),
                severity: Severity::Medium,
                data: json!({
                    "real_yield": round2(real_yield),
                    "signal": "bullish_gold",
                }),
                related_symbols: vec!["GLD".into(), "IAU".into()],
                expires_at: None,
            })
        } else {
            None
        }
    }
}

impl Analyzer for PreciousMetalsAnalyzer {
    fn name(&self) -> &'static str {
        "precious_metals_analyzer"
    }

    fn sector(&self) -> &'static str {
        "precious_metals"
    }

    fn analyze(&self) -> Result<Vec<Finding>, DomainError> {
        let mut findings = Vec::new();

        let gold = self.gold_price()?;
        let silver = self.silver_price()?;

        if let (Some(gold), Some(silver)) = (gold, silver) {
            if silver > 0.0 {
                let ratio = gold / silver;
                debug!(ratio, "gold/silver ratio computed");
                findings.extend(self.ratio_finding(ratio, gold, silver));
            }
        }

        // Dormant until the macro collector populates a real-yield reading;
        // never substitutes a default.
        if let Some(real_yield) = self.macros.real_yield()? {
            findings.extend(self.real_yield_finding(real_yield));
        }

        Ok(findings)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
