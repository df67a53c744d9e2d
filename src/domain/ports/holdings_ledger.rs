use crate::domain::entities::holding::{Holding, WatchItem};
use crate::domain::error::DomainError;

/// Read-only view onto the holdings ledger. CRUD and position arithmetic
/// are owned by the ledger module; this pipeline only consumes snapshots.
pub trait HoldingsLedger: Send + Sync {
    fn active_holdings(&self) -> Result<Vec<Holding>, DomainError>;

    fn watchlist(&self) -> Result<Vec<WatchItem>, DomainError>;
}
