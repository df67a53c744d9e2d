use crate::domain::entities::report::{GeneratedReport, NewReport, ReportListItem};
use crate::domain::error::DomainError;
use crate::domain::values::report_type::ReportType;

/// Append-only report store. There is deliberately no update or delete:
/// regeneration inserts a new row.
pub trait ReportRepository: Send + Sync {
    fn insert(&self, report: &NewReport) -> Result<i64, DomainError>;

    /// Newest-first page of report headers (no content payload).
    fn list(
        &self,
        report_type: Option<ReportType>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ReportListItem>, DomainError>;

    fn get_by_id(&self, id: i64) -> Result<Option<GeneratedReport>, DomainError>;
}
