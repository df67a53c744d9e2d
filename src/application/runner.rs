//! Analyzer runner: owns the registry, executes analyzers sequentially,
//! and persists findings as signals.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::entities::signal::{NewSignal, Signal};
use crate::domain::error::DomainError;
use crate::domain::ports::analyzer::Analyzer;
use crate::domain::ports::signal_repository::SignalRepository;
use crate::domain::values::signal_type::SignalType;

/// Fixed sector-domain to signal-type mapping. The coarse type comes from
/// the analyzer's domain, never from the analyzer instance.
fn signal_type_for_sector(sector: &str) -> SignalType {
    match sector {
        "price" => SignalType::Price,
        "macro" => SignalType::Macro,
        "smart_money" => SignalType::SmartMoney,
        "holding" => SignalType::Holding,
        _ => SignalType::Sector,
    }
}

/// Outcome of one full analyzer pass.
#[derive(Debug, Serialize)]
pub struct AnalyzerRun {
    pub analyzers_run: usize,
    pub analyzers_failed: usize,
    pub signals: Vec<Signal>,
}

pub struct AnalyzerRunner {
    repo: Arc<dyn SignalRepository>,
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl AnalyzerRunner {
    pub fn new(repo: Arc<dyn SignalRepository>) -> Self {
        Self {
            repo,
            analyzers: Vec::new(),
        }
    }

    pub fn register(&mut self, analyzer: Box<dyn Analyzer>) {
        info!(analyzer = analyzer.name(), "registered analyzer");
        self.analyzers.push(analyzer);
    }

    /// Run a single analyzer and persist its findings.
    ///
    /// An analyzer error is logged and yields zero signals; a persistence
    /// error propagates, since a silently dropped signal is a correctness
    /// gap rather than a degraded output.
    pub fn run(&self, analyzer: &dyn Analyzer) -> Result<Vec<Signal>, DomainError> {
        Ok(self.run_one(analyzer)?.unwrap_or_default())
    }

    /// `Ok(None)` means the analyzer itself failed (already logged).
    fn run_one(&self, analyzer: &dyn Analyzer) -> Result<Option<Vec<Signal>>, DomainError> {
        let findings = match analyzer.analyze() {
            Ok(findings) => findings,
            Err(e) => {
                warn!(analyzer = analyzer.name(), error = %e, "analyzer failed");
                return Ok(None);
            }
        };

        let signal_type = signal_type_for_sector(analyzer.sector());
        let mut signals = Vec::with_capacity(findings.len());
        for finding in findings {
            let new_signal = NewSignal::from_finding(
                finding,
                signal_type,
                Some(analyzer.sector().to_string()),
                analyzer.name().to_string(),
            );
            signals.push(self.repo.insert(&new_signal)?);
        }

        info!(
            analyzer = analyzer.name(),
            count = signals.len(),
            "analyzer produced signals"
        );
        Ok(Some(signals))
    }

    /// Run every registered analyzer in registration order (the order
    /// carries no semantics) and concatenate the created signals. Never
    /// fails on analyzer errors; only persistence failures propagate.
    pub fn run_all(&self) -> Result<AnalyzerRun, DomainError> {
        let mut signals = Vec::new();
        let mut failed = 0usize;

        for analyzer in &self.analyzers {
            match self.run_one(analyzer.as_ref())? {
                Some(mut batch) => signals.append(&mut batch),
                None => failed += 1,
            }
        }

        Ok(AnalyzerRun {
            analyzers_run: self.analyzers.len() - failed,
            analyzers_failed: failed,
            signals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::signal_type_for_sector;
    use crate::domain::values::signal_type::SignalType;

    #[test]
    fn sector_mapping_is_fixed() {
        assert_eq!(signal_type_for_sector("price"), SignalType::Price);
        assert_eq!(signal_type_for_sector("macro"), SignalType::Macro);
        assert_eq!(signal_type_for_sector("smart_money"), SignalType::SmartMoney);
        assert_eq!(signal_type_for_sector("holding"), SignalType::Holding);
        assert_eq!(
            signal_type_for_sector("precious_metals"),
            SignalType::Sector
        );
    }
}
