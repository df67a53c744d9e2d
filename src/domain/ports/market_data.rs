use crate::domain::error::DomainError;
use crate::domain::values::market::Market;
use chrono::NaiveDate;
use serde::Serialize;

/// A closing price observation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Quote {
    pub close: f64,
    pub as_of: NaiveDate,
}

/// Read-only quote access. Collection and storage of quotes belong to an
/// external collector; this pipeline only reads snapshots. A missing quote
/// is `Ok(None)` — callers omit the dependent output rather than fabricate
/// a price.
pub trait MarketDataProvider: Send + Sync {
    fn latest_quote(&self, symbol: &str, market: Market) -> Result<Option<Quote>, DomainError>;

    /// The close preceding the latest one.
    fn prior_close(&self, symbol: &str, market: Market) -> Result<Option<Quote>, DomainError>;

    /// The most recent close at or before `date`; used for week-start and
    /// 30-day comparisons.
    fn close_at_or_before(
        &self,
        symbol: &str,
        market: Market,
        date: NaiveDate,
    ) -> Result<Option<Quote>, DomainError>;
}
