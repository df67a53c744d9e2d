//! Daily report generator.
//!
//! One invocation walks the full state machine — collect holdings, compute
//! deltas vs the prior close, batch advisory commentary, scan
//! opportunities, assemble, persist — with no intermediate persisted state.
//! The document is built entirely in memory and inserted once at the end,
//! so a crash mid-generation leaves no partial row.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::entities::holding::Holding;
use crate::domain::entities::report::NewReport;
use crate::domain::error::DomainError;
use crate::domain::ports::advisory::{AdvisoryContext, AdvisoryService, ModelTier};
use crate::domain::ports::holdings_ledger::HoldingsLedger;
use crate::domain::ports::market_data::MarketDataProvider;
use crate::domain::ports::report_repository::ReportRepository;
use crate::domain::values::report_type::ReportType;

use super::opportunities::scan_opportunities;
use super::{
    gather_comments, pct, round2, DailyReportContent, HoldingEntry, PortfolioSummary, ReportConfig,
};

/// Proximity bands for the stop/take-profit warning flags.
const NEAR_STOP_BAND: f64 = 1.05;
const NEAR_TAKE_PROFIT_BAND: f64 = 0.95;

const VALID_ACTIONS: &[&str] = &["hold", "add", "reduce", "sell"];

pub struct DailyReportGenerator {
    ledger: Arc<dyn HoldingsLedger>,
    market: Arc<dyn MarketDataProvider>,
    advisor: Arc<dyn AdvisoryService>,
    reports: Arc<dyn ReportRepository>,
    config: ReportConfig,
}

impl DailyReportGenerator {
    pub fn new(
        ledger: Arc<dyn HoldingsLedger>,
        market: Arc<dyn MarketDataProvider>,
        advisor: Arc<dyn AdvisoryService>,
        reports: Arc<dyn ReportRepository>,
        config: ReportConfig,
    ) -> Self {
        Self {
            ledger,
            market,
            advisor,
            reports,
            config,
        }
    }

    /// Generate today's report and persist it. Returns the new report id.
    pub async fn generate(&self) -> Result<i64, DomainError> {
        let now = Utc::now();
        let holdings = self.ledger.active_holdings()?;

        let (mut entries, total_value, cash_pct) = self.build_entries(&holdings)?;

        // Worst performer first; unpriced rows sink to the end.
        entries.sort_by(|a, b| {
            let av = a.today_change_pct.unwrap_or(f64::MAX);
            let bv = b.today_change_pct.unwrap_or(f64::MAX);
            av.partial_cmp(&bv).unwrap_or(std::cmp::Ordering::Equal)
        });

        self.enrich_with_advisory(&mut entries).await;

        let opportunities = scan_opportunities(
            self.ledger.clone(),
            self.market.clone(),
            self.advisor.clone(),
            ModelTier::Fast,
            self.config,
        )
        .await?;

        let today_pnl: f64 = entries.iter().filter_map(|e| e.today_pnl).sum();
        let total_pnl: f64 = entries.iter().filter_map(|e| e.total_pnl).sum();
        let today_pnl_pct = if total_value > 0.0 {
            today_pnl / total_value * 100.0
        } else {
            0.0
        };
        let total_pnl_pct = if total_value > 0.0 {
            total_pnl / total_value * 100.0
        } else {
            0.0
        };

        let holdings_count = entries.iter().filter(|e| e.symbol != "CASH").count();

        // The list-view summary never depends on the advisory call.
        let local_summary = format!(
            "Portfolio {today_pnl_pct:+.2}% today ({holdings_count} holdings, total {:.0})",
            total_value
        );
        let ai_summary = self
            .summarize(&entries, today_pnl, today_pnl_pct, total_value)
            .await;
        let summary = ai_summary.clone().unwrap_or_else(|| local_summary.clone());

        let content = DailyReportContent {
            portfolio_summary: PortfolioSummary {
                total_value: round2(total_value),
                today_pnl: round2(today_pnl),
                today_pnl_pct: round2(today_pnl_pct),
                total_pnl: round2(total_pnl),
                total_pnl_pct: round2(total_pnl_pct),
                holdings_count,
                cash_pct: round2(cash_pct),
                ai_summary,
            },
            holdings: entries,
            opportunities,
        };

        let content = serde_json::to_value(&content)
            .map_err(|e| DomainError::Parse(format!("report content: {e}")))?;

        let id = self.reports.insert(&NewReport {
            report_type: ReportType::Daily,
            report_date: now.date_naive(),
            generated_at: now,
            summary,
            content,
        })?;
        info!(report = id, "daily report generated");
        Ok(id)
    }

    /// First pass over the ledger: price every position, compute portfolio
    /// totals and per-holding rows. Unpriced holdings keep their row with
    /// the price-derived fields absent.
    fn build_entries(
        &self,
        holdings: &[Holding],
    ) -> Result<(Vec<HoldingEntry>, f64, f64), DomainError> {
        struct Priced {
            price: Option<f64>,
            value: Option<f64>,
        }

        let mut priced = Vec::with_capacity(holdings.len());
        let mut total_value = 0.0f64;
        let mut cash_value = 0.0f64;

        for holding in holdings {
            if holding.is_cash() {
                total_value += holding.quantity;
                cash_value += holding.quantity;
                priced.push(Priced {
                    price: None,
                    value: Some(holding.quantity),
                });
                continue;
            }
            match self.market.latest_quote(&holding.symbol, holding.market)? {
                Some(quote) => {
                    let value = quote.close * holding.quantity;
                    total_value += value;
                    priced.push(Priced {
                        price: Some(quote.close),
                        value: Some(value),
                    });
                }
                None => priced.push(Priced {
                    price: None,
                    value: None,
                }),
            }
        }

        let cash_pct = if total_value > 0.0 {
            cash_value / total_value * 100.0
        } else {
            0.0
        };

        let mut entries = Vec::with_capacity(holdings.len());
        for (holding, priced) in holdings.iter().zip(priced) {
            let mut entry = HoldingEntry {
                symbol: holding.symbol.clone(),
                name: holding.name.clone(),
                market: holding.market,
                tier: holding.tier,
                weight_pct: priced.value.map(|v| {
                    if total_value > 0.0 {
                        round2(v / total_value * 100.0)
                    } else {
                        0.0
                    }
                }),
                current_price: priced.price,
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
                entry.today_change_pct = Some(0.0);
                entry.today_pnl = Some(0.0);
                entries.push(entry);
                continue;
            }

            if let Some(price) = priced.price {
                entry.total_pnl = Some(round2((price - holding.avg_cost) * holding.quantity));
                entry.total_pnl_pct = Some(round2(pct(price, holding.avg_cost)));
                if let Some(stop) = holding.stop_loss_price {
                    entry.near_stop_loss = price <= stop * NEAR_STOP_BAND;
                }
                if let Some(tp) = holding.take_profit_price {
                    entry.near_take_profit = price >= tp * NEAR_TAKE_PROFIT_BAND;
                }

                if let Some(prev) = self.market.prior_close(&holding.symbol, holding.market)? {
                    if prev.close > 0.0 {
                        entry.today_change_pct = Some(round2(pct(price, prev.close)));
                        entry.today_pnl =
                            Some(round2((price - prev.close) * holding.quantity));
                    }
                }
            }

            entries.push(entry);
        }

        Ok((entries, total_value, cash_pct))
    }

    /// Fan out advisory calls for every non-cash holding; a failed call
    /// leaves that row's commentary fields absent.
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
            .map(|&i| holding_context(&entries[i]))
            .collect();

        let comments =
            gather_comments(self.advisor.clone(), contexts, ModelTier::Fast, self.config).await;

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
        today_pnl: f64,
        today_pnl_pct: f64,
        total_value: f64,
    ) -> Option<String> {
        let mut lines = vec![
            format!("Today's P&L: {today_pnl:+.0} ({today_pnl_pct:+.2}%)"),
            format!("Total portfolio value: {total_value:.0}"),
        ];
        for entry in entries.iter().take(8) {
            if let Some(change) = entry.today_change_pct {
                lines.push(format!("{}: {change:+.2}% today", entry.symbol));
            }
        }
        let prompt = format!(
            "Write a one-sentence plain-language summary of this portfolio day:\n{}",
            lines.join("\n")
        );

        match tokio::time::timeout(
            self.config.advisory_timeout,
            self.advisor.summarize(&prompt, ModelTier::Fast),
        )
        .await
        {
            Ok(Ok(summary)) if !summary.trim().is_empty() => Some(summary.trim().to_string()),
            _ => None,
        }
    }
}

/// Build the advisory context lines for one holding row.
fn holding_context(entry: &HoldingEntry) -> AdvisoryContext {
    let mut lines = vec![
        format!("symbol: {}", entry.symbol),
        format!("market: {}", entry.market),
        format!("tier: {}", entry.tier),
    ];
    if let Some(price) = entry.current_price {
        lines.push(format!("current_price: {price:.2}"));
    }
    if let Some(change) = entry.today_change_pct {
        lines.push(format!("today_change_pct: {change:+.2}"));
    }
    if let Some(change) = entry.week_change_pct {
        lines.push(format!("week_change_pct: {change:+.2}"));
    }
    if let Some(pnl_pct) = entry.total_pnl_pct {
        lines.push(format!("total_pnl_pct: {pnl_pct:+.2}"));
    }
    if let Some(stop) = entry.stop_loss_price {
        lines.push(format!("stop_loss_price: {stop:.2}"));
    }
    if let Some(tp) = entry.take_profit_price {
        lines.push(format!("take_profit_price: {tp:.2}"));
    }
    AdvisoryContext {
        subject: entry.symbol.clone(),
        lines,
    }
}
