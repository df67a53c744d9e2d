//! Macro / policy-calendar analyzer.
//!
//! Flags upcoming policy meetings inside a one-week window (urgency rises
//! inside three days) and describes a high-policy-rate regime as an
//! informational finding. The meeting finding expires one day after the
//! meeting so it stops being current without any cleanup pass.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde_json::json;

use crate::domain::error::DomainError;
use crate::domain::ports::analyzer::{Analyzer, Finding};
use crate::domain::ports::macro_data::MacroDataProvider;
use crate::domain::values::severity::Severity;

/// Alert when a policy meeting is within this many days.
const MEETING_WARNING_DAYS: i64 = 7;
/// Inside this window the finding escalates to high severity.
const MEETING_URGENT_DAYS: i64 = 3;
/// Policy rate considered historically high, in percent.
const HIGH_RATE_THRESHOLD: f64 = 5.0;

const MEETING_RELATED: &[&str] = &["SGOV", "TLT", "SPY", "QQQ"];
const HIGH_RATE_RELATED: &[&str] = &["SGOV", "SCHD", "VYM"];

pub struct MacroAnalyzer {
    macros: Arc<dyn MacroDataProvider>,
}

impl MacroAnalyzer {
    pub fn new(macros: Arc<dyn MacroDataProvider>) -> Self {
        Self { macros }
    }

    fn meeting_finding(&self, today: NaiveDate, meeting: NaiveDate) -> Option<Finding> {
        let days_until = (meeting - today).num_days();
        if days_until > MEETING_WARNING_DAYS {
            return None;
        }

        let severity = if days_until <= MEETING_URGENT_DAYS {
            Severity::High
        } else {
            Severity::Medium
        };

        // Stale one day after the meeting.
        let expiry_date = meeting + Duration::days(1);
        let expires_at = Utc
            .with_ymd_and_hms(
                expiry_date.year(),
                expiry_date.month(),
                expiry_date.day(),
                0,
                0,
                0,
            )
            .single();

        Some(Finding {
            title: format!("FOMC Meeting in {days_until} Days"),
            description: format!(
                "Federal Reserve FOMC meeting scheduled for {}. \
                 Market volatility typically increases around FOMC announcements. \
                 Review positions and consider hedging strategies. \
                 Key watch: rate decision, dot plot, press conference.",
                meeting.format("%B %d, %Y")
            ),
            severity,
            data: json!({
                "fomc_date": meeting.to_string(),
                "days_until": days_until,
            }),
            related_symbols: MEETING_RELATED.iter().map(|s| s.to_string()).collect(),
            expires_at,
        })
    }

    fn rate_finding(&self, rate: f64) -> Option<Finding> {
        if rate < HIGH_RATE_THRESHOLD {
            return None;
        }

        Some(Finding {
            title: format!("High Interest Rate Environment ({rate:.2}%)"),
            description: format!(
                "Policy rate at {rate:.2}%, which is historically high. \
                 High rates typically pressure growth stocks and favor value/dividend stocks. \
                 Short-duration treasuries (SGOV) offer attractive risk-free returns. \
                 Consider reducing duration risk in bond holdings."
            ),
            severity: Severity::Info,
            data: json!({
                "policy_rate": rate,
                "signal": "high_rate_environment",
            }),
            related_symbols: HIGH_RATE_RELATED.iter().map(|s| s.to_string()).collect(),
            expires_at: None,
        })
    }
}

impl Analyzer for MacroAnalyzer {
    fn name(&self) -> &'static str {
        "macro_analyzer"
    }

    fn sector(&self) -> &'static str {
        "macro"
    }

    fn analyze(&self) -> Result<Vec<Finding>, DomainError> {
        let mut findings = Vec::new();
        let today = Utc::now().date_naive();

        if let Some(meeting) = self.macros.next_policy_meeting(today)? {
            findings.extend(self.meeting_finding(today, meeting));
        }

        if let Some(rate) = self.macros.policy_rate()? {
            findings.extend(self.rate_finding(rate));
        }

        Ok(findings)
    }
}
