//! Opportunity scan shared by the daily and weekly reports.
//!
//! Candidates are the explicit watchlist plus thematic peers of currently
//! held symbols. Detection is purely local (pullback, near-target); the
//! advisory service only adds the optional narrative detail, so an
//! advisory outage degrades the scan instead of emptying it.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::holding::WatchItem;
use crate::domain::error::DomainError;
use crate::domain::ports::advisory::{AdvisoryContext, AdvisoryService, ModelTier};
use crate::domain::ports::holdings_ledger::HoldingsLedger;
use crate::domain::ports::market_data::MarketDataProvider;
use crate::domain::values::market::Market;

use super::{gather_comments, pct, round2, ReportConfig};

/// Pullback flag when the 30-day change is at or below this.
const PULLBACK_THRESHOLD_PCT: f64 = -10.0;
/// "Near target" when within this distance of the watch target.
const NEAR_TARGET_PCT: f64 = 5.0;
/// Lookback window for the pullback check.
const PULLBACK_WINDOW_DAYS: i64 = 30;

/// Liquid peers scanned alongside a held symbol. Keeps the scan thematic
/// without a fundamentals feed.
const THEMATIC_PEERS: &[(&str, &[&str])] = &[
    ("GLD", &["SLV", "IAU"]),
    ("IAU", &["GLD", "SLV"]),
    ("SLV", &["GLD"]),
    ("SPY", &["QQQ", "IWM"]),
    ("QQQ", &["SPY", "SMH"]),
    ("TLT", &["IEF", "SGOV"]),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityEntry {
    pub symbol: String,
    pub name: String,
    pub market: Market,
    /// Comma-joined local signal labels (e.g. "pullback, near_target").
    pub signal_type: String,
    pub timeframe: String,
    /// Locally computed, self-contained rationale.
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
}

/// Scan the watchlist and thematic peers for entry opportunities, then
/// enrich hits with advisory commentary (best effort).
pub async fn scan_opportunities(
    ledger: Arc<dyn HoldingsLedger>,
    market: Arc<dyn MarketDataProvider>,
    advisor: Arc<dyn AdvisoryService>,
    tier: ModelTier,
    config: ReportConfig,
) -> Result<Vec<OpportunityEntry>, DomainError> {
    let holdings = ledger.active_holdings()?;
    let held: HashSet<String> = holdings.iter().map(|h| h.symbol.clone()).collect();

    let mut candidates: Vec<WatchItem> = ledger.watchlist()?;
    let mut seen: HashSet<String> = candidates.iter().map(|w| w.symbol.clone()).collect();

    for holding in &holdings {
        let Some((_, peers)) = THEMATIC_PEERS.iter().find(|(s, _)| *s == holding.symbol) else {
            continue;
        };
        for peer in *peers {
            if held.contains(*peer) || !seen.insert(peer.to_string()) {
                continue;
            }
            candidates.push(WatchItem {
                symbol: peer.to_string(),
                name: peer.to_string(),
                market: holding.market,
                theme: None,
                target_price: None,
            });
        }
    }

    let today = Utc::now().date_naive();
    let mut entries = Vec::new();

    for item in candidates {
        if held.contains(&item.symbol) {
            continue;
        }

        let Some(quote) = market.latest_quote(&item.symbol, item.market)? else {
            continue;
        };
        let current = quote.close;

        let mut labels: Vec<&str> = Vec::new();
        let mut reasons: Vec<String> = Vec::new();

        let lookback = today - Duration::days(PULLBACK_WINDOW_DAYS);
        if let Some(old) = market.close_at_or_before(&item.symbol, item.market, lookback)? {
            if old.close > 0.0 {
                let change_30d = pct(current, old.close);
                if change_30d <= PULLBACK_THRESHOLD_PCT {
                    labels.push("pullback");
                    reasons.push(format!("30-day change {:.1}%", change_30d));
                }
            }
        }

        if let Some(target) = item.target_price {
            if current > 0.0 && pct(target, current).abs() <= NEAR_TARGET_PCT {
                labels.push("near_target");
                reasons.push(format!(
                    "price ${current:.2} within {NEAR_TARGET_PCT:.0}% of target ${target:.2}"
                ));
            }
        }

        if labels.is_empty() {
            continue;
        }

        entries.push(OpportunityEntry {
            symbol: item.symbol.clone(),
            name: item.name.clone(),
            market: item.market,
            signal_type: labels.join(", "),
            timeframe: "long_term".to_string(),
            reason: reasons.join("; "),
            detail: None,
            target_price: item.target_price.map(round2),
            current_price: Some(round2(current)),
        });
    }

    // Advisory enrichment: one context per hit, failures leave detail empty.
    let contexts: Vec<AdvisoryContext> = entries
        .iter()
        .map(|e| AdvisoryContext {
            subject: e.symbol.clone(),
            lines: vec![
                format!("symbol: {}", e.symbol),
                format!("market: {}", e.market),
                format!("signals: {}", e.signal_type),
                format!("reason: {}", e.reason),
                match e.current_price {
                    Some(p) => format!("current_price: {p:.2}"),
                    None => "current_price: unavailable".to_string(),
                },
            ],
        })
        .collect();

    let comments = gather_comments(advisor, contexts, tier, config).await;
    for (entry, comment) in entries.iter_mut().zip(comments) {
        if let Some(comment) = comment {
            entry.detail = comment.detail_markdown.or(Some(comment.short_comment));
        }
    }

    Ok(entries)
}
