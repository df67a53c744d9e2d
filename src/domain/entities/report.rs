use crate::domain::values::report_type::ReportType;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A persisted report. Rows are append-only: regeneration inserts a new row
/// and earlier rows remain for history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedReport {
    pub id: i64,
    pub report_type: ReportType,
    pub report_date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub summary: String,
    pub content: serde_json::Value,
}

/// Fields required to persist a report. `summary` must already be non-empty
/// here; generators compute it from local aggregates before persisting.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub report_type: ReportType,
    pub report_date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub summary: String,
    pub content: serde_json::Value,
}

/// Cheap list-view projection: everything but the content document.
#[derive(Debug, Clone, Serialize)]
pub struct ReportListItem {
    pub id: i64,
    pub report_type: ReportType,
    pub report_date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub summary: String,
}
