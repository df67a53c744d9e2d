//! Advisory port: the external commentary provider.
//!
//! Treated as a black box with a timeout contract. Report generators call
//! it per holding/opportunity with bounded concurrency and capture each
//! outcome independently — one failed or slow call never cancels siblings
//! or aborts the report.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::error::DomainError;

/// Model tier to request. Fast is the low-latency/low-cost tier used by the
/// daily cadence; Quality is the higher-latency tier the weekly report uses
/// for medium-term theses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Fast,
    Quality,
}

/// Facts handed to the advisory service for one subject. `lines` are
/// preassembled "key: value" statements so the service needs no data access
/// of its own.
#[derive(Debug, Clone, Serialize)]
pub struct AdvisoryContext {
    /// Symbol or topic the commentary is about.
    pub subject: String,
    pub lines: Vec<String>,
}

/// Commentary for one subject.
#[derive(Debug, Clone, Serialize)]
pub struct AdvisoryComment {
    pub short_comment: String,
    /// One of hold/add/reduce/sell when the service suggests an action.
    pub action_label: Option<String>,
    pub detail_markdown: Option<String>,
}

#[async_trait]
pub trait AdvisoryService: Send + Sync {
    async fn comment(
        &self,
        context: &AdvisoryContext,
        tier: ModelTier,
    ) -> Result<AdvisoryComment, DomainError>;

    /// Free-form summarization used for the report-level narrative.
    async fn summarize(&self, prompt: &str, tier: ModelTier) -> Result<String, DomainError>;
}
