//! Report generation: shared content document types, the bounded advisory
//! fan-out, and the daily/weekly generators.

pub mod daily;
pub mod opportunities;
pub mod weekly;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::entities::report::{GeneratedReport, ReportListItem};
use crate::domain::error::DomainError;
use crate::domain::ports::advisory::{AdvisoryComment, AdvisoryContext, AdvisoryService, ModelTier};
use crate::domain::ports::report_repository::ReportRepository;
use crate::domain::values::market::Market;
use crate::domain::values::report_type::ReportType;
use crate::domain::values::severity::Severity;
use crate::domain::values::tier::Tier;

use self::opportunities::OpportunityEntry;

/// Tunables for report generation, fixed at process start.
#[derive(Debug, Clone, Copy)]
pub struct ReportConfig {
    /// Per-call advisory timeout; a timed-out call counts as failed.
    pub advisory_timeout: Duration,
    /// Maximum concurrent advisory calls.
    pub advisory_concurrency: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            advisory_timeout: Duration::from_secs(30),
            advisory_concurrency: 4,
        }
    }
}

/// Issue advisory calls with bounded concurrency and a per-call timeout.
///
/// The result vector is aligned with the input order; a failed or timed-out
/// call becomes `None` and never disturbs its siblings.
pub(crate) async fn gather_comments(
    advisor: Arc<dyn AdvisoryService>,
    contexts: Vec<AdvisoryContext>,
    tier: ModelTier,
    config: ReportConfig,
) -> Vec<Option<AdvisoryComment>> {
    let count = contexts.len();
    let mut outcomes: Vec<Option<AdvisoryComment>> = vec![None; count];

    let collected: Vec<(usize, Option<AdvisoryComment>)> =
        stream::iter(contexts.into_iter().enumerate())
            .map(|(idx, ctx)| {
                let advisor = advisor.clone();
                async move {
                    let outcome =
                        tokio::time::timeout(config.advisory_timeout, advisor.comment(&ctx, tier))
                            .await;
                    let comment = match outcome {
                        Ok(Ok(comment)) => Some(comment),
                        Ok(Err(e)) => {
                            warn!(subject = %ctx.subject, error = %e, "advisory call failed");
                            None
                        }
                        Err(_) => {
                            warn!(subject = %ctx.subject, "advisory call timed out");
                            None
                        }
                    };
                    (idx, comment)
                }
            })
            .buffer_unordered(config.advisory_concurrency.max(1))
            .collect()
            .await;

    for (idx, comment) in collected {
        outcomes[idx] = comment;
    }
    outcomes
}

// ── Content document types (§ report schema) ─────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub today_pnl: f64,
    pub today_pnl_pct: f64,
    pub total_pnl: f64,
    pub total_pnl_pct: f64,
    pub holdings_count: usize,
    pub cash_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}

/// One holding row in a report. Daily reports populate
/// `today_change_pct`; weekly reports populate `week_change_pct`. Price
/// fields stay absent when no quote was available — never a made-up value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingEntry {
    pub symbol: String,
    pub name: String,
    pub market: Market,
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today_change_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_change_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today_pnl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pnl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pnl_pct: Option<f64>,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit_price: Option<f64>,
    pub near_stop_loss: bool,
    pub near_take_profit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReportContent {
    pub portfolio_summary: PortfolioSummary,
    pub holdings: Vec<HoldingEntry>,
    pub opportunities: Vec<OpportunityEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingHighlight {
    pub symbol: String,
    pub name: String,
    pub week_change_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekSummary {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub week_pnl: f64,
    pub week_pnl_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_holding: Option<HoldingHighlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst_holding: Option<HoldingHighlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}

/// Aggregation of one sector's macro/capital-flow signals over the week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalGroup {
    pub sector: String,
    pub count: usize,
    pub max_severity: Severity,
    pub titles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroCapital {
    pub signal_groups: Vec<SignalGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_yield: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAlert {
    pub level: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingEvent {
    pub date: NaiveDate,
    pub event: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReportContent {
    pub week_summary: WeekSummary,
    pub macro_capital: MacroCapital,
    pub holdings: Vec<HoldingEntry>,
    pub opportunities: Vec<OpportunityEntry>,
    pub risk_alerts: Vec<RiskAlert>,
    pub next_week_events: Vec<UpcomingEvent>,
}

// ── Report retrieval use case ────────────────────────────────────────────

pub struct ReportsUseCase {
    repo: Arc<dyn ReportRepository>,
}

impl ReportsUseCase {
    pub fn new(repo: Arc<dyn ReportRepository>) -> Self {
        Self { repo }
    }

    pub fn list(
        &self,
        report_type: Option<ReportType>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ReportListItem>, DomainError> {
        self.repo.list(report_type, limit, offset)
    }

    pub fn detail(&self, id: i64) -> Result<GeneratedReport, DomainError> {
        self.repo
            .get_by_id(id)?
            .ok_or_else(|| DomainError::NotFound(format!("report {id}")))
    }
}

/// Two-decimal rounding used for every display percentage/amount.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Signed percentage: (current/compare - 1) * 100.
pub(crate) fn pct(current: f64, compare: f64) -> f64 {
    if compare == 0.0 {
        0.0
    } else {
        (current / compare - 1.0) * 100.0
    }
}
