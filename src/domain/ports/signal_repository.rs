use crate::domain::entities::signal::{NewSignal, Signal};
use crate::domain::error::DomainError;
use crate::domain::values::severity::Severity;
use crate::domain::values::signal_status::SignalStatus;
use crate::domain::values::signal_type::SignalType;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct SignalFilter {
    pub signal_type: Option<SignalType>,
    pub sector: Option<String>,
    /// Keep signals with severity >= this floor.
    pub min_severity: Option<Severity>,
    pub status: Option<SignalStatus>,
    pub since: Option<DateTime<Utc>>,
    /// Expired signals are excluded unless this is set. They are never
    /// deleted, only filtered out of active views.
    pub include_expired: bool,
    pub limit: Option<usize>,
}

pub trait SignalRepository: Send + Sync {
    /// Persist a new signal and return it with its store-assigned id.
    fn insert(&self, signal: &NewSignal) -> Result<Signal, DomainError>;

    /// List signals newest-first, applying the filter.
    fn list(&self, filter: &SignalFilter) -> Result<Vec<Signal>, DomainError>;

    fn get_by_id(&self, id: i64) -> Result<Option<Signal>, DomainError>;

    /// Mutate the lifecycle status. The only descriptive mutation the store
    /// supports; everything else on a signal is immutable.
    fn update_status(&self, id: i64, status: SignalStatus) -> Result<(), DomainError>;

    /// Record notification delivery with a single conditional update
    /// (`... AND telegram_sent = 0`). Returns true when this call flipped
    /// the flag, false when some earlier call already had.
    fn mark_notified(&self, id: i64, at: DateTime<Utc>) -> Result<bool, DomainError>;
}
