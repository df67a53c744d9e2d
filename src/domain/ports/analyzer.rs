//! Analyzer port: the contract every signal analyzer implements.
//!
//! An analyzer is a pure evaluation of currently available external state.
//! It reads injected provider handles as read-only snapshots, holds no
//! state between invocations, and makes no assumptions about ordering
//! relative to other analyzers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::error::DomainError;
use crate::domain::values::severity::Severity;

/// A single typed observation produced by an analyzer. Transient: the
/// runner converts it into a persisted signal immediately.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// Short human label.
    pub title: String,
    /// Self-contained rationale; no external lookups needed to read it.
    pub description: String,
    pub severity: Severity,
    /// Analyzer-specific numeric/string fields backing the description,
    /// so its claims are independently verifiable. Always an object.
    pub data: serde_json::Value,
    /// Instruments the finding concerns; may be empty.
    pub related_symbols: Vec<String>,
    /// After this instant the finding is stale and must not drive new
    /// notifications.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Trait for signal analyzers.
///
/// `analyze()` may fail; the runner treats a failure as "zero findings this
/// cycle" and logs the cause, so one analyzer can never take down the rest
/// of the batch.
pub trait Analyzer: Send + Sync {
    /// Stable identifier, recorded as the signal's source.
    fn name(&self) -> &'static str;

    /// Domain grouping (e.g. "precious_metals"), recorded as the signal's
    /// sector and mapped to its coarse type by the runner.
    fn sector(&self) -> &'static str;

    /// Evaluate current external state and return zero or more findings.
    fn analyze(&self) -> Result<Vec<Finding>, DomainError>;
}
