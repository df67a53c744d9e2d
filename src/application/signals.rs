//! Signal query/update use case backing the exposed signal operations.

use std::sync::Arc;

use crate::domain::entities::signal::Signal;
use crate::domain::error::DomainError;
use crate::domain::ports::signal_repository::{SignalFilter, SignalRepository};
use crate::domain::values::signal_status::SignalStatus;

pub struct SignalsUseCase {
    repo: Arc<dyn SignalRepository>,
}

impl SignalsUseCase {
    pub fn new(repo: Arc<dyn SignalRepository>) -> Self {
        Self { repo }
    }

    pub fn list(&self, filter: &SignalFilter) -> Result<Vec<Signal>, DomainError> {
        self.repo.list(filter)
    }

    pub fn get(&self, id: i64) -> Result<Signal, DomainError> {
        self.repo
            .get_by_id(id)?
            .ok_or_else(|| DomainError::NotFound(format!("signal {id}")))
    }

    /// The only mutation the pipeline exposes: move the lifecycle status.
    pub fn update_status(&self, id: i64, status: SignalStatus) -> Result<Signal, DomainError> {
        // Surface a not-found before attempting the write.
        let _ = self.get(id)?;
        self.repo.update_status(id, status)?;
        self.get(id)
    }
}
