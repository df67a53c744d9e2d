//! Signal store tests: lifecycle, filters, and the conditional
//! notification mark.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::temp_db;
use folioscope::domain::entities::signal::NewSignal;
use folioscope::domain::ports::signal_repository::{SignalFilter, SignalRepository};
use folioscope::domain::values::severity::Severity;
use folioscope::domain::values::signal_status::SignalStatus;
use folioscope::domain::values::signal_type::SignalType;
use folioscope::infrastructure::sqlite::migrations::run_migrations;
use folioscope::infrastructure::sqlite::signal_repo::SqliteSignalRepo;

fn repo(path: &str) -> Arc<SqliteSignalRepo> {
    let conn = rusqlite::Connection::open(path).unwrap();
    run_migrations(&conn).unwrap();
    Arc::new(SqliteSignalRepo::new(conn))
}

fn new_signal(title: &str, severity: Severity, signal_type: SignalType) -> NewSignal {
    NewSignal {
        signal_type,
        sector: Some("test_sector".to_string()),
        title: title.to_string(),
        description: "a test signal".to_string(),
        severity,
        source: "test_source".to_string(),
        data: serde_json::json!({"k": 1}),
        related_symbols: vec!["SPY".to_string()],
        expires_at: None,
    }
}

#[test]
fn insert_assigns_sequential_ids_and_defaults() {
    let (_dir, path) = temp_db();
    let repo = repo(&path);

    let first = repo
        .insert(&new_signal("one", Severity::Low, SignalType::Sector))
        .unwrap();
    let second = repo
        .insert(&new_signal("two", Severity::High, SignalType::Price))
        .unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(first.status, SignalStatus::Active);
    assert!(!first.telegram_sent);
    assert!(first.telegram_sent_at.is_none());
}

#[test]
fn round_trip_preserves_fields() {
    let (_dir, path) = temp_db();
    let repo = repo(&path);

    let created = repo
        .insert(&new_signal("round trip", Severity::Critical, SignalType::Macro))
        .unwrap();
    let fetched = repo.get_by_id(created.id).unwrap().unwrap();

    assert_eq!(fetched.title, "round trip");
    assert_eq!(fetched.severity, Severity::Critical);
    assert_eq!(fetched.signal_type, SignalType::Macro);
    assert_eq!(fetched.sector.as_deref(), Some("test_sector"));
    assert_eq!(fetched.source, "test_source");
    assert_eq!(fetched.data, serde_json::json!({"k": 1}));
    assert_eq!(fetched.related_symbols, vec!["SPY"]);
}

#[test]
fn severity_floor_filters_below() {
    let (_dir, path) = temp_db();
    let repo = repo(&path);
    for severity in [
        Severity::Info,
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ] {
        repo.insert(&new_signal(
            &severity.to_string(),
            severity,
            SignalType::Sector,
        ))
        .unwrap();
    }

    let filter = SignalFilter {
        min_severity: Some(Severity::Medium),
        ..Default::default()
    };
    let hits = repo.list(&filter).unwrap();
    assert_eq!(hits.len(), 3);
    assert!(hits.iter().all(|s| s.severity >= Severity::Medium));
}

#[test]
fn type_and_status_filters() {
    let (_dir, path) = temp_db();
    let repo = repo(&path);
    let price = repo
        .insert(&new_signal("price", Severity::Low, SignalType::Price))
        .unwrap();
    repo.insert(&new_signal("macro", Severity::Low, SignalType::Macro))
        .unwrap();

    repo.update_status(price.id, SignalStatus::Read).unwrap();

    let by_type = repo
        .list(&SignalFilter {
            signal_type: Some(SignalType::Price),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_type.len(), 1);
    assert_eq!(by_type[0].title, "price");

    let by_status = repo
        .list(&SignalFilter {
            status: Some(SignalStatus::Active),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_status.len(), 1);
    assert_eq!(by_status[0].title, "macro");
}

#[test]
fn expired_signals_are_excluded_not_deleted() {
    let (_dir, path) = temp_db();
    let repo = repo(&path);

    let mut expired = new_signal("expired", Severity::High, SignalType::Macro);
    expired.expires_at = Some(Utc::now() - Duration::hours(1));
    repo.insert(&expired).unwrap();

    let mut live = new_signal("live", Severity::High, SignalType::Macro);
    live.expires_at = Some(Utc::now() + Duration::hours(1));
    repo.insert(&live).unwrap();

    let active = repo.list(&SignalFilter::default()).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].title, "live");

    let all = repo
        .list(&SignalFilter {
            include_expired: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn update_status_unknown_id_is_not_found() {
    let (_dir, path) = temp_db();
    let repo = repo(&path);
    assert!(repo.update_status(999, SignalStatus::Read).is_err());
    assert!(repo.get_by_id(999).unwrap().is_none());
}

#[test]
fn mark_notified_is_a_one_shot() {
    let (_dir, path) = temp_db();
    let repo = repo(&path);
    let signal = repo
        .insert(&new_signal("notify me", Severity::High, SignalType::Price))
        .unwrap();

    assert!(repo.mark_notified(signal.id, Utc::now()).unwrap());
    // Second conditional update loses: the flag never flips back.
    assert!(!repo.mark_notified(signal.id, Utc::now()).unwrap());

    let stored = repo.get_by_id(signal.id).unwrap().unwrap();
    assert!(stored.telegram_sent);
    assert!(stored.telegram_sent_at.is_some());
}
