use async_trait::async_trait;

use crate::domain::error::DomainError;

/// Outbound messaging channel. Implementations are expected to be cheap to
/// probe via `is_enabled` so callers can skip formatting entirely when the
/// channel is not configured.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn is_enabled(&self) -> bool;

    async fn send(&self, text: &str) -> Result<(), DomainError>;
}
