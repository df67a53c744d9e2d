use crate::domain::error::DomainError;
use chrono::NaiveDate;

/// Named macro indicator lookups. Every reading is optional: an indicator
/// the external collector has never populated comes back `Ok(None)` and
/// the dependent analysis stays dormant.
pub trait MacroDataProvider: Send + Sync {
    /// 10-year real-yield proxy, in percent.
    fn real_yield(&self) -> Result<Option<f64>, DomainError>;

    /// Policy-rate proxy (e.g. fed funds), in percent.
    fn policy_rate(&self) -> Result<Option<f64>, DomainError>;

    /// Next scheduled policy meeting on or after `after`.
    fn next_policy_meeting(&self, after: NaiveDate) -> Result<Option<NaiveDate>, DomainError>;
}
