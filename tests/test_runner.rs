//! Analyzer runner tests: persistence mapping and failure isolation.

mod common;

use std::sync::Arc;

use common::temp_db;
use folioscope::application::runner::AnalyzerRunner;
use folioscope::domain::error::DomainError;
use folioscope::domain::ports::analyzer::{Analyzer, Finding};
use folioscope::domain::ports::signal_repository::{SignalFilter, SignalRepository};
use folioscope::domain::values::severity::Severity;
use folioscope::domain::values::signal_status::SignalStatus;
use folioscope::domain::values::signal_type::SignalType;
use folioscope::infrastructure::sqlite::migrations::run_migrations;
use folioscope::infrastructure::sqlite::signal_repo::SqliteSignalRepo;

struct StaticAnalyzer {
    name: &'static str,
    sector: &'static str,
    count: usize,
}

impl Analyzer for StaticAnalyzer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn sector(&self) -> &'static str {
        self.sector
    }

    fn analyze(&self) -> Result<Vec<Finding>, DomainError> {
        Ok((0..self.count)
            .map(|i| Finding {
                title: format!("{} finding {i}", self.name),
                description: "static test observation".to_string(),
                severity: Severity::Medium,
                data: serde_json::json!({"index": i}),
                related_symbols: vec!["SPY".to_string()],
                expires_at: None,
            })
            .collect())
    }
}

struct FailingAnalyzer;

impl Analyzer for FailingAnalyzer {
    fn name(&self) -> &'static str {
        "failing_analyzer"
    }

    fn sector(&self) -> &'static str {
        "macro"
    }

    fn analyze(&self) -> Result<Vec<Finding>, DomainError> {
        Err(DomainError::InvalidInput("upstream data corrupt".into()))
    }
}

fn signal_repo(path: &str) -> Arc<dyn SignalRepository> {
    let conn = rusqlite::Connection::open(path).unwrap();
    run_migrations(&conn).unwrap();
    Arc::new(SqliteSignalRepo::new(conn))
}

#[test]
fn findings_map_one_to_one_into_signals() {
    let (_dir, path) = temp_db();
    let repo = signal_repo(&path);
    let mut runner = AnalyzerRunner::new(repo.clone());
    runner.register(Box::new(StaticAnalyzer {
        name: "metals_test",
        sector: "precious_metals",
        count: 2,
    }));

    let run = runner.run_all().unwrap();
    assert_eq!(run.signals.len(), 2);
    assert_eq!(run.analyzers_run, 1);
    assert_eq!(run.analyzers_failed, 0);

    let signal = &run.signals[0];
    assert_eq!(signal.source, "metals_test");
    assert_eq!(signal.sector.as_deref(), Some("precious_metals"));
    assert_eq!(signal.signal_type, SignalType::Sector);
    assert_eq!(signal.severity, Severity::Medium);
    assert_eq!(signal.status, SignalStatus::Active);
    assert!(!signal.telegram_sent);
    assert_eq!(signal.related_symbols, vec!["SPY"]);

    // And they are actually persisted.
    let stored = repo.list(&SignalFilter::default()).unwrap();
    assert_eq!(stored.len(), 2);
}

#[test]
fn domain_mapping_sets_signal_type() {
    let (_dir, path) = temp_db();
    let repo = signal_repo(&path);
    let mut runner = AnalyzerRunner::new(repo);
    runner.register(Box::new(StaticAnalyzer {
        name: "price_test",
        sector: "price",
        count: 1,
    }));
    runner.register(Box::new(StaticAnalyzer {
        name: "macro_test",
        sector: "macro",
        count: 1,
    }));

    let run = runner.run_all().unwrap();
    assert_eq!(run.signals[0].signal_type, SignalType::Price);
    assert_eq!(run.signals[1].signal_type, SignalType::Macro);
}

#[test]
fn one_failing_analyzer_does_not_reduce_the_others() {
    // Baseline: the failing analyzer simply unregistered.
    let (_dir, path) = temp_db();
    let repo = signal_repo(&path);
    let mut baseline = AnalyzerRunner::new(repo);
    baseline.register(Box::new(StaticAnalyzer {
        name: "healthy_a",
        sector: "price",
        count: 2,
    }));
    baseline.register(Box::new(StaticAnalyzer {
        name: "healthy_b",
        sector: "macro",
        count: 1,
    }));
    let baseline_count = baseline.run_all().unwrap().signals.len();

    // Same analyzers plus one that raises, registered in the middle.
    let (_dir2, path2) = temp_db();
    let repo2 = signal_repo(&path2);
    let mut runner = AnalyzerRunner::new(repo2);
    runner.register(Box::new(StaticAnalyzer {
        name: "healthy_a",
        sector: "price",
        count: 2,
    }));
    runner.register(Box::new(FailingAnalyzer));
    runner.register(Box::new(StaticAnalyzer {
        name: "healthy_b",
        sector: "macro",
        count: 1,
    }));

    let run = runner.run_all().unwrap();
    assert_eq!(run.signals.len(), baseline_count);
    assert_eq!(run.analyzers_failed, 1);
    assert_eq!(run.analyzers_run, 2);
}

#[test]
fn run_single_analyzer_returns_created_signals() {
    let (_dir, path) = temp_db();
    let repo = signal_repo(&path);
    let runner = AnalyzerRunner::new(repo);

    let analyzer = StaticAnalyzer {
        name: "solo",
        sector: "price",
        count: 3,
    };
    let signals = runner.run(&analyzer).unwrap();
    assert_eq!(signals.len(), 3);

    let failing = FailingAnalyzer;
    assert!(runner.run(&failing).unwrap().is_empty());
}
