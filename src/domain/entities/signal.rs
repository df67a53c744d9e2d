use crate::domain::values::severity::Severity;
use crate::domain::values::signal_status::SignalStatus;
use crate::domain::values::signal_type::SignalType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted analyzer finding with a status lifecycle.
///
/// Identity and the descriptive fields (`title`, `description`, `severity`,
/// `data`, `related_symbols`, `source`, `signal_type`) are immutable after
/// creation; only `status` and the telegram-sent pair change, and
/// `telegram_sent` never transitions back to false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: i64,
    pub signal_type: SignalType,
    pub sector: Option<String>,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub status: SignalStatus,
    pub source: String,
    pub data: serde_json::Value,
    pub related_symbols: Vec<String>,
    pub telegram_sent: bool,
    pub telegram_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Signal {
    /// Whether the signal has passed its expiry and should no longer drive
    /// notifications or appear in active queries.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Fields required to create a signal. Every signal goes through this
/// factory so defaults (`status = active`, unsent notification state) are a
/// single explicit decision rather than a constructor side effect.
#[derive(Debug, Clone)]
pub struct NewSignal {
    pub signal_type: SignalType,
    pub sector: Option<String>,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub source: String,
    pub data: serde_json::Value,
    pub related_symbols: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewSignal {
    /// Map an analyzer finding 1:1 into a persistable signal, attaching the
    /// provenance fields the finding itself does not carry.
    pub fn from_finding(
        finding: crate::domain::ports::analyzer::Finding,
        signal_type: SignalType,
        sector: Option<String>,
        source: String,
    ) -> Self {
        Self {
            signal_type,
            sector,
            title: finding.title,
            description: finding.description,
            severity: finding.severity,
            source,
            data: finding.data,
            related_symbols: finding.related_symbols,
            expires_at: finding.expires_at,
        }
    }
}
