use crate::domain::entities::signal::{NewSignal, Signal};
use crate::domain::error::DomainError;
use crate::domain::ports::signal_repository::{SignalFilter, SignalRepository};
use crate::domain::values::severity::Severity;
use crate::domain::values::signal_status::SignalStatus;
use crate::domain::values::signal_type::SignalType;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::Mutex;
use tracing::warn;

/// Column list used in all SELECT queries.
const SELECT_COLS: &str = "id, signal_type, sector, title, description, severity, status, source, data, related_symbols, telegram_sent, telegram_sent_at, created_at, expires_at";

pub struct SqliteSignalRepo {
    conn: Mutex<Connection>,
}

impl SqliteSignalRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_signal(row: &rusqlite::Row) -> Result<Signal, rusqlite::Error> {
        let type_str: String = row.get(1)?;
        let severity_str: String = row.get(5)?;
        let status_str: String = row.get(6)?;
        let data_str: String = row.get(8)?;
        let symbols_str: String = row.get(9)?;
        let sent_int: i32 = row.get(10)?;
        let sent_at_str: Option<String> = row.get(11)?;
        let created_str: String = row.get(12)?;
        let expires_str: Option<String> = row.get(13)?;

        Ok(Signal {
            id: row.get(0)?,
            signal_type: type_str.parse().unwrap_or_else(|_| {
                warn!("invalid signal_type '{type_str}' in row, defaulting to sector");
                SignalType::Sector
            }),
            sector: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            severity: severity_str.parse().unwrap_or_else(|_| {
                warn!("invalid severity '{severity_str}' in row, defaulting to info");
                Severity::Info
            }),
            status: status_str.parse().unwrap_or_else(|_| {
                warn!("invalid status '{status_str}' in row, defaulting to active");
                SignalStatus::Active
            }),
            source: row.get(7)?,
            data: serde_json::from_str(&data_str).unwrap_or(serde_json::Value::Null),
            related_symbols: serde_json::from_str(&symbols_str).unwrap_or_default(),
            telegram_sent: sent_int != 0,
            telegram_sent_at: sent_at_str.and_then(|s| parse_utc(&s)),
            created_at: parse_utc(&created_str).unwrap_or_else(Utc::now),
            expires_at: expires_str.and_then(|s| parse_utc(&s)),
        })
    }
}

fn parse_utc(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

impl SignalRepository for SqliteSignalRepo {
    fn insert(&self, signal: &NewSignal) -> Result<Signal, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO signals (signal_type, sector, title, description, severity, status, source, data, related_symbols, telegram_sent, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10, ?11)",
            params![
                signal.signal_type.to_string(),
                signal.sector,
                signal.title,
                signal.description,
                signal.severity.to_string(),
                SignalStatus::Active.to_string(),
                signal.source,
                serde_json::to_string(&signal.data).unwrap_or_else(|_| "{}".into()),
                serde_json::to_string(&signal.related_symbols).unwrap_or_else(|_| "[]".into()),
                created_at.to_rfc3339(),
                signal.expires_at.map(|dt| dt.to_rfc3339()),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to insert signal: {e}")))?;

        Ok(Signal {
            id: conn.last_insert_rowid(),
            signal_type: signal.signal_type,
            sector: signal.sector.clone(),
            title: signal.title.clone(),
            description: signal.description.clone(),
            severity: signal.severity,
            status: SignalStatus::Active,
            source: signal.source.clone(),
            data: signal.data.clone(),
            related_symbols: signal.related_symbols.clone(),
            telegram_sent: false,
            telegram_sent_at: None,
            created_at,
            expires_at: signal.expires_at,
        })
    }

    fn list(&self, filter: &SignalFilter) -> Result<Vec<Signal>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut sql = format!("SELECT {} FROM signals WHERE 1=1", SELECT_COLS);
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(signal_type) = &filter.signal_type {
            sql.push_str(&format!(" AND signal_type = ?{}", param_values.len() + 1));
            param_values.push(Box::new(signal_type.to_string()));
        }
        if let Some(sector) = &filter.sector {
            sql.push_str(&format!(" AND sector = ?{}", param_values.len() + 1));
            param_values.push(Box::new(sector.clone()));
        }
        if let Some(floor) = &filter.min_severity {
            // Severity is stored as text; the floor becomes an IN list of
            // every level at or above it.
            let allowed: Vec<String> = [
                Severity::Info,
                Severity::Low,
                Severity::Medium,
                Severity::High,
                Severity::Critical,
            ]
            .iter()
            .filter(|s| *s >= floor)
            .map(|s| format!("'{s}'"))
            .collect();
            sql.push_str(&format!(" AND severity IN ({})", allowed.join(", ")));
        }
        if let Some(status) = &filter.status {
            sql.push_str(&format!(" AND status = ?{}", param_values.len() + 1));
            param_values.push(Box::new(status.to_string()));
        }
        if let Some(since) = &filter.since {
            sql.push_str(&format!(" AND created_at >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(since.to_rfc3339()));
        }
        if !filter.include_expired {
            sql.push_str(&format!(
                " AND (expires_at IS NULL OR expires_at > ?{})",
                param_values.len() + 1
            ));
            param_values.push(Box::new(Utc::now().to_rfc3339()));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT ?{}", param_values.len() + 1));
            param_values.push(Box::new(limit as i64));
        }

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let signals = stmt
            .query_map(params_refs.as_slice(), Self::row_to_signal)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(signals)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Signal>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!("SELECT {} FROM signals WHERE id = ?1", SELECT_COLS);
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], Self::row_to_signal)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }

    fn update_status(&self, id: i64, status: SignalStatus) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let changed = conn
            .execute(
                "UPDATE signals SET status = ?1 WHERE id = ?2",
                params![status.to_string(), id],
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("signal {id}")));
        }
        Ok(())
    }

    fn mark_notified(&self, id: i64, at: DateTime<Utc>) -> Result<bool, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        // Single conditional update: only the first caller flips the flag,
        // and it never flips back.
        let changed = conn
            .execute(
                "UPDATE signals SET telegram_sent = 1, telegram_sent_at = ?1
                 WHERE id = ?2 AND telegram_sent = 0",
                params![at.to_rfc3339(), id],
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(changed > 0)
    }
}
