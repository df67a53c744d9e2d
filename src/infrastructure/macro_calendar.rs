//! Macro data provider: the policy-meeting calendar plus collected
//! indicator lookups.
//!
//! Meeting dates are a fixed calendar (check the Fed schedule when
//! extending). Indicator readings come from the `macro_indicators` table
//! the external collector maintains; a series that was never collected
//! reads as `None` and dependent analyses stay dormant.

use crate::domain::error::DomainError;
use crate::domain::ports::macro_data::MacroDataProvider;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::Mutex;

/// FRED series id for the 10-year TIPS yield (real-yield proxy).
const REAL_YIELD_SERIES: &str = "DFII10";
/// FRED series id for the effective federal funds rate.
const POLICY_RATE_SERIES: &str = "DFF";

/// FOMC meeting dates (second day of each two-day meeting), 2025-2027.
const FOMC_DATES: &[(i32, u32, u32)] = &[
    (2025, 1, 29),
    (2025, 3, 19),
    (2025, 5, 7),
    (2025, 6, 18),
    (2025, 7, 30),
    (2025, 9, 17),
    (2025, 11, 5),
    (2025, 12, 17),
    (2026, 1, 28),
    (2026, 3, 18),
    (2026, 5, 6),
    (2026, 6, 17),
    (2026, 7, 29),
    (2026, 9, 16),
    (2026, 11, 4),
    (2026, 12, 16),
    (2027, 1, 27),
    (2027, 3, 17),
    (2027, 5, 5),
    (2027, 6, 16),
    (2027, 7, 28),
    (2027, 9, 15),
    (2027, 11, 3),
    (2027, 12, 15),
];

pub struct CalendarMacroProvider {
    conn: Mutex<Connection>,
}

impl CalendarMacroProvider {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn latest_value(&self, series_id: &str) -> Result<Option<f64>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT value FROM macro_indicators WHERE series_id = ?1
                 ORDER BY date DESC LIMIT 1",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![series_id], |row| row.get::<_, f64>(0))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }
}

impl MacroDataProvider for CalendarMacroProvider {
    fn real_yield(&self) -> Result<Option<f64>, DomainError> {
        self.latest_value(REAL_YIELD_SERIES)
    }

    fn policy_rate(&self) -> Result<Option<f64>, DomainError> {
        self.latest_value(POLICY_RATE_SERIES)
    }

    fn next_policy_meeting(&self, after: NaiveDate) -> Result<Option<NaiveDate>, DomainError> {
        Ok(FOMC_DATES
            .iter()
            .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
            .find(|date| *date >= after))
    }
}
