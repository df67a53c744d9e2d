//! Shared test helpers: temp databases and fake collaborators.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};

use folioscope::application::reports::ReportConfig;
use folioscope::domain::entities::holding::{Holding, WatchItem};
use folioscope::domain::error::DomainError;
use folioscope::domain::ports::advisory::{
    AdvisoryComment, AdvisoryContext, AdvisoryService, ModelTier,
};
use folioscope::domain::ports::holdings_ledger::HoldingsLedger;
use folioscope::domain::ports::macro_data::MacroDataProvider;
use folioscope::domain::ports::market_data::{MarketDataProvider, Quote};
use folioscope::domain::ports::notifier::Notifier;
use folioscope::domain::values::market::Market;
use folioscope::domain::values::tier::Tier;
use folioscope::Folioscope;

/// A scratch database file; keep the TempDir alive for the test's duration.
pub fn temp_db() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir
        .path()
        .join("folioscope.db")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

pub fn make_holding(
    symbol: &str,
    quantity: f64,
    avg_cost: f64,
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
) -> Holding {
    Holding {
        id: 0,
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        market: Market::Us,
        tier: Tier::Medium,
        quantity,
        avg_cost,
        stop_loss_price: stop_loss,
        take_profit_price: take_profit,
    }
}

pub fn make_watch_item(symbol: &str, target_price: Option<f64>) -> WatchItem {
    WatchItem {
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        market: Market::Us,
        theme: None,
        target_price,
    }
}

// ── Fake market data ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeMarketData {
    latest: HashMap<String, f64>,
    prior: HashMap<String, f64>,
    historical: HashMap<String, f64>,
}

impl FakeMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latest(mut self, symbol: &str, close: f64) -> Self {
        self.latest.insert(symbol.to_string(), close);
        self
    }

    pub fn with_prior(mut self, symbol: &str, close: f64) -> Self {
        self.prior.insert(symbol.to_string(), close);
        self
    }

    /// Close returned for any `close_at_or_before` lookup on this symbol.
    pub fn with_historical(mut self, symbol: &str, close: f64) -> Self {
        self.historical.insert(symbol.to_string(), close);
        self
    }
}

impl MarketDataProvider for FakeMarketData {
    fn latest_quote(&self, symbol: &str, _market: Market) -> Result<Option<Quote>, DomainError> {
        Ok(self.latest.get(symbol).map(|&close| Quote {
            close,
            as_of: Utc::now().date_naive(),
        }))
    }

    fn prior_close(&self, symbol: &str, _market: Market) -> Result<Option<Quote>, DomainError> {
        Ok(self.prior.get(symbol).map(|&close| Quote {
            close,
            as_of: Utc::now().date_naive() - Duration::days(1),
        }))
    }

    fn close_at_or_before(
        &self,
        symbol: &str,
        _market: Market,
        date: NaiveDate,
    ) -> Result<Option<Quote>, DomainError> {
        Ok(self
            .historical
            .get(symbol)
            .map(|&close| Quote { close, as_of: date }))
    }
}

// ── Fake macro data ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeMacroData {
    pub real_yield: Option<f64>,
    pub policy_rate: Option<f64>,
    pub next_meeting: Option<NaiveDate>,
}

impl FakeMacroData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_real_yield(mut self, value: f64) -> Self {
        self.real_yield = Some(value);
        self
    }

    pub fn with_policy_rate(mut self, value: f64) -> Self {
        self.policy_rate = Some(value);
        self
    }

    pub fn with_meeting_in_days(mut self, days: i64) -> Self {
        self.next_meeting = Some(Utc::now().date_naive() + Duration::days(days));
        self
    }
}

impl MacroDataProvider for FakeMacroData {
    fn real_yield(&self) -> Result<Option<f64>, DomainError> {
        Ok(self.real_yield)
    }

    fn policy_rate(&self) -> Result<Option<f64>, DomainError> {
        Ok(self.policy_rate)
    }

    fn next_policy_meeting(&self, _after: NaiveDate) -> Result<Option<NaiveDate>, DomainError> {
        Ok(self.next_meeting)
    }
}

// ── Fake ledger ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeLedger {
    pub holdings: Vec<Holding>,
    pub watchlist: Vec<WatchItem>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_holding(mut self, holding: Holding) -> Self {
        self.holdings.push(holding);
        self
    }

    pub fn with_watch_item(mut self, item: WatchItem) -> Self {
        self.watchlist.push(item);
        self
    }
}

impl HoldingsLedger for FakeLedger {
    fn active_holdings(&self) -> Result<Vec<Holding>, DomainError> {
        Ok(self.holdings.clone())
    }

    fn watchlist(&self) -> Result<Vec<WatchItem>, DomainError> {
        Ok(self.watchlist.clone())
    }
}

// ── Fake advisor ─────────────────────────────────────────────────────────

pub struct FakeAdvisor {
    pub fail: bool,
    pub action: Option<String>,
    pub calls: Mutex<usize>,
}

impl FakeAdvisor {
    pub fn ok() -> Self {
        Self {
            fail: false,
            action: Some("add".to_string()),
            calls: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            action: None,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl AdvisoryService for FakeAdvisor {
    async fn comment(
        &self,
        context: &AdvisoryContext,
        _tier: ModelTier,
    ) -> Result<AdvisoryComment, DomainError> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(DomainError::Advisory("advisory unavailable".into()));
        }
        Ok(AdvisoryComment {
            short_comment: format!("{} looks steady", context.subject),
            action_label: self.action.clone(),
            detail_markdown: Some(format!("Thesis for {} remains intact.", context.subject)),
        })
    }

    async fn summarize(&self, _prompt: &str, _tier: ModelTier) -> Result<String, DomainError> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(DomainError::Advisory("advisory unavailable".into()));
        }
        Ok("A quiet session with no major moves.".to_string())
    }
}

// ── Recording notifier ───────────────────────────────────────────────────

pub struct RecordingNotifier {
    pub enabled: bool,
    pub fail: bool,
    pub sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            fail: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            fail: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            enabled: true,
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last_message(&self) -> Option<String> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn send(&self, text: &str) -> Result<(), DomainError> {
        if self.fail {
            return Err(DomainError::Notification("channel down".into()));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

// ── Facade setup ─────────────────────────────────────────────────────────

pub struct TestEnv {
    pub fs: Folioscope,
    pub notifier: Arc<RecordingNotifier>,
    pub advisor: Arc<FakeAdvisor>,
    _dir: tempfile::TempDir,
}

/// Wire a full pipeline over a temp database with the given fakes.
pub fn setup_with(
    ledger: FakeLedger,
    market: FakeMarketData,
    macros: FakeMacroData,
    advisor: FakeAdvisor,
    notifier: RecordingNotifier,
) -> TestEnv {
    let (dir, path) = temp_db();
    let notifier = Arc::new(notifier);
    let advisor = Arc::new(advisor);
    let fs = Folioscope::with_providers(
        &path,
        Arc::new(ledger),
        Arc::new(market),
        Arc::new(macros),
        advisor.clone(),
        notifier.clone(),
        ReportConfig::default(),
    )
    .expect("pipeline setup");
    TestEnv {
        fs,
        notifier,
        advisor,
        _dir: dir,
    }
}
