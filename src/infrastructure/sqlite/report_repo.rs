use crate::domain::entities::report::{GeneratedReport, NewReport, ReportListItem};
use crate::domain::error::DomainError;
use crate::domain::ports::report_repository::ReportRepository;
use crate::domain::values::report_type::ReportType;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use std::sync::Mutex;
use tracing::warn;

pub struct SqliteReportRepo {
    conn: Mutex<Connection>,
}

impl SqliteReportRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

fn parse_report_type(s: &str) -> ReportType {
    s.parse().unwrap_or_else(|_| {
        warn!("invalid report_type '{s}' in row, defaulting to daily");
        ReportType::Daily
    })
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|_| Utc::now().date_naive())
}

fn parse_utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl ReportRepository for SqliteReportRepo {
    fn insert(&self, report: &NewReport) -> Result<i64, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO generated_reports (report_type, report_date, generated_at, summary, content)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                report.report_type.to_string(),
                report.report_date.format("%Y-%m-%d").to_string(),
                report.generated_at.to_rfc3339(),
                report.summary,
                serde_json::to_string(&report.content)
                    .map_err(|e| DomainError::Parse(format!("report content: {e}")))?,
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to insert report: {e}")))?;
        Ok(conn.last_insert_rowid())
    }

    fn list(
        &self,
        report_type: Option<ReportType>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ReportListItem>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut sql = String::from(
            "SELECT id, report_type, report_date, generated_at, summary
             FROM generated_reports WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(report_type) = report_type {
            sql.push_str(&format!(" AND report_type = ?{}", param_values.len() + 1));
            param_values.push(Box::new(report_type.to_string()));
        }

        sql.push_str(&format!(
            " ORDER BY generated_at DESC, id DESC LIMIT ?{} OFFSET ?{}",
            param_values.len() + 1,
            param_values.len() + 2
        ));
        param_values.push(Box::new(limit as i64));
        param_values.push(Box::new(offset as i64));

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let items = stmt
            .query_map(params_refs.as_slice(), |row| {
                let type_str: String = row.get(1)?;
                let date_str: String = row.get(2)?;
                let generated_str: String = row.get(3)?;
                Ok(ReportListItem {
                    id: row.get(0)?,
                    report_type: parse_report_type(&type_str),
                    report_date: parse_date(&date_str),
                    generated_at: parse_utc(&generated_str),
                    summary: row.get(4)?,
                })
            })
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(items)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<GeneratedReport>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT id, report_type, report_date, generated_at, summary, content
                 FROM generated_reports WHERE id = ?1",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], |row| {
                let type_str: String = row.get(1)?;
                let date_str: String = row.get(2)?;
                let generated_str: String = row.get(3)?;
                let content_str: String = row.get(5)?;
                Ok(GeneratedReport {
                    id: row.get(0)?,
                    report_type: parse_report_type(&type_str),
                    report_date: parse_date(&date_str),
                    generated_at: parse_utc(&generated_str),
                    summary: row.get(4)?,
                    content: serde_json::from_str(&content_str)
                        .unwrap_or(serde_json::Value::Null),
                })
            })
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }
}
