//! Full pipeline scenarios: analyzers → signals → notifications → reports.

mod common;

use common::{
    make_holding, setup_with, FakeAdvisor, FakeLedger, FakeMacroData, FakeMarketData,
    RecordingNotifier,
};
use folioscope::domain::ports::signal_repository::SignalFilter;
use folioscope::domain::values::severity::Severity;
use folioscope::domain::values::signal_status::SignalStatus;
use folioscope::domain::values::signal_type::SignalType;

fn busy_morning() -> (FakeLedger, FakeMarketData, FakeMacroData) {
    // Gold 2000 / silver 22 (ratio 90.9), FOMC in 3 days, and one holding
    // sitting below its stop loss.
    let ledger = FakeLedger::new().with_holding(make_holding(
        "NVO",
        10.0,
        900.0,
        Some(800.0),
        None,
    ));
    let market = FakeMarketData::new()
        .with_latest("GLD", 200.0)
        .with_latest("SLV", 22.0)
        .with_latest("NVO", 780.0);
    let macros = FakeMacroData::new().with_meeting_in_days(3);
    (ledger, market, macros)
}

#[tokio::test]
async fn analyzer_pass_persists_and_notifies_each_signal_once() {
    let (ledger, market, macros) = busy_morning();
    let env = setup_with(
        ledger,
        market,
        macros,
        FakeAdvisor::ok(),
        RecordingNotifier::enabled(),
    );

    let outcome = env.fs.run_analyzers_with_notifications().await.unwrap();
    assert_eq!(outcome.run.signals.len(), 3);
    assert_eq!(outcome.run.analyzers_failed, 0);
    // ratio medium + FOMC high + stop loss critical: all notifiable.
    assert_eq!(outcome.notifications_sent, 3);
    assert_eq!(env.notifier.sent_count(), 3);

    // The exact values the descriptions claim are in each signal's data.
    let signals = env
        .fs
        .signals(&SignalFilter {
            include_expired: true,
            ..Default::default()
        })
        .unwrap();

    let ratio = signals
        .iter()
        .find(|s| s.source == "precious_metals_analyzer")
        .unwrap();
    assert_eq!(ratio.severity, Severity::Medium);
    assert!(ratio.title.contains("Silver"));
    let value = ratio.data["gold_silver_ratio"].as_f64().unwrap();
    assert!((value - 90.91).abs() < 0.01);

    let fomc = signals
        .iter()
        .find(|s| s.source == "macro_analyzer")
        .unwrap();
    assert_eq!(fomc.severity, Severity::High);
    assert_eq!(fomc.data["days_until"], 3);
    assert_eq!(fomc.signal_type, SignalType::Macro);

    let stop = signals
        .iter()
        .find(|s| s.source == "price_alert_analyzer")
        .unwrap();
    assert_eq!(stop.severity, Severity::Critical);
    assert_eq!(stop.data["alert_type"], "stop_loss");
    assert_eq!(stop.signal_type, SignalType::Price);

    // Every delivered signal carries the one-shot flag.
    assert!(signals.iter().all(|s| s.telegram_sent));

    // A second triggered pass recreates findings as new signals but the
    // earlier rows stay delivered exactly once.
    let again = env.fs.run_analyzers_with_notifications().await.unwrap();
    assert_eq!(again.run.signals.len(), 3);
    assert_eq!(env.notifier.sent_count(), 6);
}

#[tokio::test]
async fn quiet_day_produces_no_signals() {
    // Ratio inside the neutral band, no meeting nearby, holding moves 0.53%.
    let ledger = FakeLedger::new().with_holding(make_holding("NVO", 10.0, 900.0, None, None));
    let market = FakeMarketData::new()
        .with_latest("GLD", 165.0)
        .with_latest("SLV", 22.0)
        .with_latest("NVO", 950.0)
        .with_prior("NVO", 945.0);
    let macros = FakeMacroData::new().with_meeting_in_days(30);

    let env = setup_with(
        ledger,
        market,
        macros,
        FakeAdvisor::ok(),
        RecordingNotifier::enabled(),
    );

    let outcome = env.fs.run_analyzers_with_notifications().await.unwrap();
    assert!(outcome.run.signals.is_empty());
    assert_eq!(outcome.notifications_sent, 0);
}

#[tokio::test]
async fn signal_status_lifecycle_via_facade() {
    let (ledger, market, macros) = busy_morning();
    let env = setup_with(
        ledger,
        market,
        macros,
        FakeAdvisor::ok(),
        RecordingNotifier::disabled(),
    );

    let run = env.fs.run_analyzers().unwrap();
    let id = run.signals[0].id;

    let updated = env.fs.update_signal_status(id, SignalStatus::Read).unwrap();
    assert_eq!(updated.status, SignalStatus::Read);
    // Descriptive fields are untouched by the status move.
    assert_eq!(updated.title, run.signals[0].title);
    assert_eq!(updated.severity, run.signals[0].severity);

    let active_only = env
        .fs
        .signals(&SignalFilter {
            status: Some(SignalStatus::Active),
            include_expired: true,
            ..Default::default()
        })
        .unwrap();
    assert!(active_only.iter().all(|s| s.id != id));

    assert!(env.fs.signal(9999).is_err());
}

#[tokio::test]
async fn analyzer_pass_then_reports_share_one_store() {
    let (ledger, market, macros) = busy_morning();
    let env = setup_with(
        ledger,
        market,
        macros,
        FakeAdvisor::ok(),
        RecordingNotifier::disabled(),
    );

    env.fs.run_analyzers().unwrap();
    let daily = env.fs.generate_daily_report().await.unwrap();
    let weekly = env.fs.generate_weekly_report().await.unwrap();

    let list = env.fs.reports(None, 10, 0).unwrap();
    assert_eq!(list.len(), 2);
    assert!(env.fs.report(daily).is_ok());
    assert!(env.fs.report(weekly).is_ok());
}
