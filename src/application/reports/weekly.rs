//! Weekly report generator.
//!
//! Same single-pass state machine as the daily report, but the performance
//! window runs from Monday of the current calendar week, the advisory
//! calls use the quality tier with a medium-term emphasis, and the
//! document adds the week summary, macro/capital aggregation, risk alerts
//! and a forward-looking events list.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use tracing::info;

use crate::domain::entities::holding::Holding;
use crate::domain::entities::report::NewReport;
use crate::domain::error::DomainError;
use crate::domain::ports::advisory::{AdvisoryContext, AdvisoryService, ModelTier};
use crate::domain::ports::holdings_ledger::HoldingsLedger;
use crate::domain::ports::macro_data::MacroDataProvider;
use crate::domain::ports::market_data::MarketDataProvider;
use crate::domain::ports::report_repository::ReportRepository;
use crate::domain::ports::signal_repository::{SignalFilter, SignalRepository};
use crate::domain::values::report_type::ReportType;
use crate::domain::values::signal_type::SignalType;
use crate::domain::values::tier::Tier;

use super::opportunities::scan_opportunities;
use super::{
    gather_comments, pct, round2, HoldingEntry, HoldingHighlight, MacroCapital, ReportConfig,
    RiskAlert, SignalGroup, UpcomingEvent, WeekSummary, WeeklyReportContent,
};

/// A single position above this weight raises a concentration alert.
const CONCENTRATION_PCT: f64 = 25.0;
/// Tier drift beyond this many points vs target raises an alert.
const TIER_DRIFT_PCT: f64 = 10.0;
/// How many sample titles each signal group keeps.
const GROUP_TITLE_SAMPLE: usize = 3;

const VALID_ACTIONS: &[&str] = &["hold", "add", "reduce", "sell"];

pub struct WeeklyReportGenerator {
    ledger: Arc<dyn HoldingsLedger>,
    market: Arc<dyn MarketDataProvider>,
    macros: Arc<dyn MacroDataProvider>,
    signals: Arc<dyn SignalRepository>,
    advisor: Arc<dyn AdvisoryService>,
    reports: Arc<dyn ReportRepository>,
    config: ReportConfig,
}

impl WeeklyReportGenerator {
    pub fn new(
        ledger: Arc<dyn HoldingsLedger>,
        market: Arc<dyn MarketDataProvider>,
        macros: Arc<dyn MacroDataProvider>,
        signals: Arc<dyn SignalRepository>,
        advisor: Arc<dyn AdvisoryService>,
        reports: Arc<dyn ReportRepository>,
        config: ReportConfig,
    ) -> Self {
        Self {
            ledger,
            market,
            macros,
            signals,
            advisor,
            reports,
            config,
        }
    }

    /// Generate the report for the current calendar week and persist it.
    pub async fn generate(&self) -> Result<i64, DomainError> {
        let now = Utc::now();
        let week_end = now.date_naive();
        let week_start = week_end - Duration::days(week_end.weekday().num_days_from_monday() as i64);

        let holdings = self.ledger.active_holdings()?;
        let (mut entries, total_value, week_pnl, best, worst) =
            self.build_entries(&holdings, week_start)?;

        self.enrich_with_advisory(&mut entries).await;

        let macro_capital = self.build_macro_capital(week_start)?;
        let risk_alerts = build_risk_alerts(&entries);
        let next_week_events = self.next_week_events(week_end)?;

        let opportunities = scan_opportunities(
            self.ledger.clone(),
            self.market.clone(),
            self.advisor.clone(),
            ModelTier::Quality,
            self.config,
        )
        .await?;

        let week_pnl_pct = if total_value > 0.0 {
            week_pnl / total_value * 100.0
        } else {
            0.0
        };

        let local_summary = format!("Week P&L {week_pnl:+.0} ({week_pnl_pct:+.2}%)");
        let ai_summary = self
            .summarize(&entries, week_pnl, week_pnl_pct, &best, &worst, &macro_capital)
            .await;
        let summary = ai_summary.clone().unwrap_or_else(|| local_summary.clone());

        let content = WeeklyReportContent {
            week_summary: WeekSummary {
                week_start,
                week_end,
                week_pnl: round2(week_pnl),
                week_pnl_pct: round2(week_pnl_pct),
                best_holding: best,
                worst_holding: worst,
                ai_summary,
            },
            macro_capital,
            holdings: entries,
            opportunities,
            risk_alerts,
            next_week_events,
        };

        let content = serde_json::to_value(&content)
            .map_err(|e| DomainError::Parse(format!("report content: {e}")))?;

        let id = self.reports.insert(&NewReport {
            report_type: ReportType::Weekly,
            report_date: week_end,
            generated_at: now,
            summary,
            content,
        })?;
        info!(report = id, "weekly report generated");
        Ok(id)
    }

    /// Build holding rows over the week window and track best/worst.
    #[allow(clippy::type_complexity)]
    fn build_entries(
        &self,
        holdings: &[Holding],
        week_start: NaiveDate,
    ) -> Result<
        (
            Vec<HoldingEntry>,
            f64,
            f64,
            Option<HoldingHighlight>,
            Option<HoldingHighlight>,
        ),
        DomainError,
    > {
        let mut entries = Vec::with_capacity(holdings.len());
        let mut total_value = 0.0f64;
        let mut week_pnl = 0.0f64;
        let mut best: Option<HoldingHighlight> = None;
        let mut worst: Option<HoldingHighlight> = None;

        for holding in holdings {
            let mut entry = HoldingEntry {
                symbol: holding.symbol.clone(),
                name: holding.name.clone(),
                market: holding.market,
                tier: holding.tier,
                weight_pct: None,
                current_price: None,
                today_change_pct: None,
                week_change_pct: None,
                today_pnl: None,
                total_pnl: None,
                total_pnl_pct: None,
                action: "hold".to_string(),
                ai_comment: None,
                ai_detail: None,
                stop_loss_price: holding.stop_loss_price,
                take_profit_price: holding.take_profit_price,
                near_stop_loss: false,
                near_take_profit: false,
            };

            if holding.is_cash() {
                total_value += holding.quantity;
                entry.week_change_pct = Some(0.0);
                entries.push(entry);
                continue;
            }

            let Some(quote) = self.market.latest_quote(&holding.symbol, holding.market)? else {
                entries.push(entry);
                continue;
            };
            let price = quote.close;
            total_value += price * holding.quantity;
            entry.current_price = Some(price);
            entry.total_pnl = Some(round2((price - holding.avg_cost) * holding.quantity));
            entry.total_pnl_pct = Some(round2(pct(price, holding.avg_cost)));

            if let Some(start) =
                self.market
                    .close_at_or_before(&holding.symbol, holding.market, week_start)?
            {
                if start.close > 0.0 {
                    let change = pct(price, start.close);
                    entry.week_change_pct = Some(round2(change));
                    week_pnl += (price - start.close) * holding.quantity;

                    let highlight = HoldingHighlight {
                        symbol: holding.symbol.clone(),
                        name: holding.name.clone(),
                        week_change_pct: round2(change),
                    };
                    if best
                        .as_ref()
                        .is_none_or(|b| change > b.week_change_pct)
                    {
                        best = Some(highlight.clone());
                    }
                    if worst
                        .as_ref()
                        .is_none_or(|w| change < w.week_change_pct)
                    {
                        worst = Some(highlight);
                    }
                }
            }

            entries.push(entry);
        }

        // Weights need the final total, so fill them in a second pass.
        if total_value > 0.0 {
            for (entry, holding) in entries.iter_mut().zip(holdings) {
                if holding.is_cash() {
                    entry.weight_pct = Some(round2(holding.quantity / total_value * 100.0));
                } else if let Some(price) = entry.current_price {
                    entry.weight_pct =
                        Some(round2(price * holding.quantity / total_value * 100.0));
                }
            }
        }

        Ok((entries, total_value, week_pnl, best, worst))
    }

    /// Aggregate the week's macro and capital-flow signals by sector.
    fn build_macro_capital(&self, week_start: NaiveDate) -> Result<MacroCapital, DomainError> {
        let since = week_start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc());

        let mut weekly_signals = Vec::new();
        for signal_type in [SignalType::Macro, SignalType::SmartMoney] {
            weekly_signals.extend(self.signals.list(&SignalFilter {
                signal_type: Some(signal_type),
                since,
                include_expired: true,
                ..Default::default()
            })?);
        }

        let mut groups: BTreeMap<String, SignalGroup> = BTreeMap::new();
        for signal in weekly_signals {
            let sector = signal.sector.clone().unwrap_or_else(|| "general".to_string());
            let group = groups.entry(sector.clone()).or_insert_with(|| SignalGroup {
                sector,
                count: 0,
                max_severity: signal.severity,
                titles: Vec::new(),
            });
            group.count += 1;
            group.max_severity = group.max_severity.max(signal.severity);
            if group.titles.len() < GROUP_TITLE_SAMPLE {
                group.titles.push(signal.title.clone());
            }
        }

        Ok(MacroCapital {
            signal_groups: groups.into_values().collect(),
            policy_rate: self.macros.policy_rate()?,
            real_yield: self.macros.real_yield()?,
        })
    }

    /// Policy meetings inside the coming week.
    fn next_week_events(&self, today: NaiveDate) -> Result<Vec<UpcomingEvent>, DomainError> {
        let mut events = Vec::new();
        if let Some(meeting) = self.macros.next_policy_meeting(today)? {
            if (meeting - today).num_days() <= 7 {
                events.push(UpcomingEvent {
                    date: meeting,
                    event: "FOMC meeting".to_string(),
                });
            }
        }
        Ok(events)
    }

    /// Quality-tier commentary per holding, emphasizing the medium-term
    /// thesis over short-term noise.
    async fn enrich_with_advisory(&self, entries: &mut [HoldingEntry]) {
        let targets: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.symbol != "CASH")
            .map(|(i, _)| i)
            .collect();
        if targets.is_empty() {
            return;
        }

        let contexts: Vec<AdvisoryContext> = targets
            .iter()
            .map(|&i| {
                let entry = &entries[i];
                let mut lines = vec![
                    format!("symbol: {}", entry.symbol),
                    format!("market: {}", entry.market),
                    format!("tier: {}", entry.tier),
                    "focus: medium-term thesis, not day-to-day noise".to_string(),
                ];
                if let Some(price) = entry.current_price {
                    lines.push(format!("current_price: {price:.2}"));
                }
                if let Some(change) = entry.week_change_pct {
                    lines.push(format!("week_change_pct: {change:+.2}"));
                }
                if let Some(pnl_pct) = entry.total_pnl_pct {
                    lines.push(format!("total_pnl_pct: {pnl_pct:+.2}"));
                }
                AdvisoryContext {
                    subject: entry.symbol.clone(),
                    lines,
                }
            })
            .collect();

        let comments = gather_comments(
            self.advisor.clone(),
            contexts,
            ModelTier::Quality,
            self.config,
        )
        .await;

        for (&i, comment) in targets.iter().zip(comments) {
            let Some(comment) = comment else { continue };
            let entry = &mut entries[i];
            entry.ai_comment = Some(comment.short_comment);
            entry.ai_detail = comment.detail_markdown;
            if let Some(action) = comment.action_label {
                let action = action.to_lowercase();
                if VALID_ACTIONS.contains(&action.as_str()) {
                    entry.action = action;
                }
            }
        }
    }

    async fn summarize(
        &self,
        entries: &[HoldingEntry],
        week_pnl: f64,
        week_pnl_pct: f64,
        best: &Option<HoldingHighlight>,
        worst: &Option<HoldingHighlight>,
        macro_capital: &MacroCapital,
    ) -> Option<String> {
        let mut lines = vec![format!("Week P&L: {week_pnl:+.0} ({week_pnl_pct:+.2}%)")];
        if let Some(best) = best {
            lines.push(format!(
                "Best holding: {} ({:+.1}%)",
                best.symbol, best.week_change_pct
            ));
        }
        if let Some(worst) = worst {
            lines.push(format!(
                "Worst holding: {} ({:+.1}%)",
                worst.symbol, worst.week_change_pct
            ));
        }
        if let Some(rate) = macro_capital.policy_rate {
            lines.push(format!("Policy rate: {rate:.2}%"));
        }
        for group in &macro_capital.signal_groups {
            lines.push(format!(
                "{} signals this week in {} (max {})",
                group.count, group.sector, group.max_severity
            ));
        }
        for entry in entries.iter().take(5) {
            if let (Some(change), Some(weight)) = (entry.week_change_pct, entry.weight_pct) {
                lines.push(format!(
                    "{}: {change:+.1}% this week, {weight:.1}% of portfolio",
                    entry.symbol
                ));
            }
        }
        let prompt = format!(
            "Write a two-sentence review of this portfolio week, \
             emphasizing the medium-term picture:\n{}",
            lines.join("\n")
        );

        match tokio::time::timeout(
            self.config.advisory_timeout,
            self.advisor.summarize(&prompt, ModelTier::Quality),
        )
        .await
        {
            Ok(Ok(summary)) if !summary.trim().is_empty() => Some(summary.trim().to_string()),
            _ => None,
        }
    }
}

/// Concentration and tier-drift checks against the target allocations.
fn build_risk_alerts(entries: &[HoldingEntry]) -> Vec<RiskAlert> {
    let mut alerts = Vec::new();

    for entry in entries {
        if entry.symbol == "CASH" {
            continue;
        }
        if let Some(weight) = entry.weight_pct {
            if weight > CONCENTRATION_PCT {
                alerts.push(RiskAlert {
                    level: "high".to_string(),
                    message: format!(
                        "{} is {weight:.0}% of the portfolio (concentration limit {CONCENTRATION_PCT:.0}%)",
                        entry.symbol
                    ),
                });
            }
        }
    }

    let mut tier_weights: BTreeMap<Tier, f64> = BTreeMap::new();
    for entry in entries {
        if entry.symbol == "CASH" {
            continue;
        }
        if let Some(weight) = entry.weight_pct {
            *tier_weights.entry(entry.tier).or_insert(0.0) += weight;
        }
    }
    for (tier, actual) in tier_weights {
        let drift = actual - tier.target_pct();
        if drift.abs() > TIER_DRIFT_PCT {
            alerts.push(RiskAlert {
                level: "medium".to_string(),
                message: format!(
                    "{tier} tier at {actual:.0}% vs {:.0}% target ({drift:+.0} points)",
                    tier.target_pct()
                ),
            });
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::market::Market;

    fn entry(symbol: &str, tier: Tier, weight: f64) -> HoldingEntry {
        HoldingEntry {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            market: Market::Us,
            tier,
            weight_pct: Some(weight),
            current_price: Some(100.0),
            today_change_pct: None,
            week_change_pct: None,
            today_pnl: None,
            total_pnl: None,
            total_pnl_pct: None,
            action: "hold".to_string(),
            ai_comment: None,
            ai_detail: None,
            stop_loss_price: None,
            take_profit_price: None,
            near_stop_loss: false,
            near_take_profit: false,
        }
    }

    #[test]
    fn concentration_alert_above_25_pct() {
        let entries = vec![
            entry("AAA", Tier::Stable, 55.0),
            entry("BBB", Tier::Medium, 25.0),
            entry("CCC", Tier::Gamble, 20.0),
        ];
        let alerts = build_risk_alerts(&entries);
        assert!(alerts
            .iter()
            .any(|a| a.level == "high" && a.message.contains("AAA")));
        // Exactly 25% does not trip the limit.
        assert!(!alerts.iter().any(|a| a.message.contains("BBB") && a.level == "high"));
    }

    #[test]
    fn tier_drift_alert_beyond_band() {
        // stable 70% vs 50% target: +20 points drift.
        let entries = vec![
            entry("AAA", Tier::Stable, 20.0),
            entry("BBB", Tier::Stable, 25.0),
            entry("CCC", Tier::Stable, 25.0),
            entry("DDD", Tier::Medium, 30.0),
        ];
        let alerts = build_risk_alerts(&entries);
        assert!(alerts
            .iter()
            .any(|a| a.level == "medium" && a.message.contains("stable")));
        assert!(!alerts
            .iter()
            .any(|a| a.level == "medium" && a.message.contains("medium tier")));
    }
}
