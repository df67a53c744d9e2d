pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use crate::application::notify::NotificationFanout;
use crate::application::reports::daily::DailyReportGenerator;
use crate::application::reports::weekly::WeeklyReportGenerator;
use crate::application::reports::{ReportConfig, ReportsUseCase};
use crate::application::runner::{AnalyzerRun, AnalyzerRunner};
use crate::application::signals::SignalsUseCase;
use crate::domain::entities::report::{GeneratedReport, ReportListItem};
use crate::domain::entities::signal::Signal;
use crate::domain::error::DomainError;
use crate::domain::ports::advisory::AdvisoryService;
use crate::domain::ports::holdings_ledger::HoldingsLedger;
use crate::domain::ports::macro_data::MacroDataProvider;
use crate::domain::ports::market_data::MarketDataProvider;
use crate::domain::ports::notifier::Notifier;
use crate::domain::ports::report_repository::ReportRepository;
use crate::domain::ports::signal_repository::{SignalFilter, SignalRepository};
use crate::domain::values::report_type::ReportType;
use crate::domain::values::signal_status::SignalStatus;
use crate::infrastructure::advisory::{AdvisoryConfig, GatewayAdvisor};
use crate::infrastructure::macro_calendar::CalendarMacroProvider;
use crate::infrastructure::sqlite::migrations::run_migrations;
use crate::infrastructure::sqlite::portfolio_store::SqlitePortfolioStore;
use crate::infrastructure::sqlite::report_repo::SqliteReportRepo;
use crate::infrastructure::sqlite::signal_repo::SqliteSignalRepo;
use crate::infrastructure::telegram::{TelegramConfig, TelegramNotifier};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::Arc;

/// Result of one triggered analyzer pass plus its notification fan-out.
#[derive(Debug, Serialize)]
pub struct AnalyzeOutcome {
    #[serde(flatten)]
    pub run: AnalyzerRun,
    pub notifications_sent: usize,
}

pub struct Folioscope {
    runner: AnalyzerRunner,
    fanout: NotificationFanout,
    daily: DailyReportGenerator,
    weekly: WeeklyReportGenerator,
    signals_uc: SignalsUseCase,
    reports_uc: ReportsUseCase,
}

fn open_wal(db_path: &str) -> Result<Connection, DomainError> {
    let conn = Connection::open(db_path)
        .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
    Ok(conn)
}

impl Folioscope {
    /// Build the full pipeline against `db_path`, configuring the external
    /// channels from `FOLIOSCOPE_*` environment variables. Configuration is
    /// read once here and immutable afterwards.
    pub fn new(db_path: &str) -> Result<Self, DomainError> {
        let telegram = TelegramConfig {
            bot_token: std::env::var("FOLIOSCOPE_TELEGRAM_TOKEN").unwrap_or_default(),
            chat_id: std::env::var("FOLIOSCOPE_TELEGRAM_CHAT_ID").unwrap_or_default(),
            enabled: std::env::var("FOLIOSCOPE_TELEGRAM_ENABLED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        };

        let defaults = AdvisoryConfig::default();
        let advisory = AdvisoryConfig {
            base_url: std::env::var("FOLIOSCOPE_ADVISORY_URL").unwrap_or_default(),
            api_key: std::env::var("FOLIOSCOPE_ADVISORY_KEY").unwrap_or_default(),
            fast_model: std::env::var("FOLIOSCOPE_ADVISORY_FAST_MODEL")
                .unwrap_or(defaults.fast_model),
            quality_model: std::env::var("FOLIOSCOPE_ADVISORY_QUALITY_MODEL")
                .unwrap_or(defaults.quality_model),
        };

        let portfolio = Arc::new(SqlitePortfolioStore::new(open_wal(db_path)?));
        let macros = Arc::new(CalendarMacroProvider::new(open_wal(db_path)?));

        Self::with_providers(
            db_path,
            portfolio.clone(),
            portfolio,
            macros,
            Arc::new(GatewayAdvisor::new(advisory)),
            Arc::new(TelegramNotifier::new(telegram)),
            ReportConfig::default(),
        )
    }

    /// Wire the pipeline with injected collaborators. Tests pass fakes for
    /// everything external; the signal and report stores always live in
    /// `db_path` (use a file path so every connection sees one database).
    pub fn with_providers(
        db_path: &str,
        ledger: Arc<dyn HoldingsLedger>,
        market: Arc<dyn MarketDataProvider>,
        macros: Arc<dyn MacroDataProvider>,
        advisor: Arc<dyn AdvisoryService>,
        notifier: Arc<dyn Notifier>,
        config: ReportConfig,
    ) -> Result<Self, DomainError> {
        let conn1 = open_wal(db_path)?;
        let conn2 = open_wal(db_path)?;

        run_migrations(&conn1)?;

        let signal_repo: Arc<dyn SignalRepository> = Arc::new(SqliteSignalRepo::new(conn1));
        let report_repo: Arc<dyn ReportRepository> = Arc::new(SqliteReportRepo::new(conn2));

        let mut runner = AnalyzerRunner::new(signal_repo.clone());
        runner.register(Box::new(
            application::analyzers::precious_metals::PreciousMetalsAnalyzer::new(
                market.clone(),
                macros.clone(),
            ),
        ));
        runner.register(Box::new(application::analyzers::fomc::MacroAnalyzer::new(
            macros.clone(),
        )));
        runner.register(Box::new(
            application::analyzers::price_alerts::PriceAlertAnalyzer::new(
                ledger.clone(),
                market.clone(),
            ),
        ));

        Ok(Self {
            runner,
            fanout: NotificationFanout::new(signal_repo.clone(), notifier),
            daily: DailyReportGenerator::new(
                ledger.clone(),
                market.clone(),
                advisor.clone(),
                report_repo.clone(),
                config,
            ),
            weekly: WeeklyReportGenerator::new(
                ledger,
                market,
                macros,
                signal_repo.clone(),
                advisor,
                report_repo.clone(),
                config,
            ),
            signals_uc: SignalsUseCase::new(signal_repo),
            reports_uc: ReportsUseCase::new(report_repo),
        })
    }

    // Delegating methods

    /// Run all analyzers without touching the notification channel.
    pub fn run_analyzers(&self) -> Result<AnalyzerRun, DomainError> {
        self.runner.run_all()
    }

    /// Run all analyzers, then fan out eligible signals exactly once.
    pub async fn run_analyzers_with_notifications(&self) -> Result<AnalyzeOutcome, DomainError> {
        let run = self.runner.run_all()?;
        let notifications_sent = self.fanout.dispatch_batch(&run.signals).await?;
        Ok(AnalyzeOutcome {
            run,
            notifications_sent,
        })
    }

    pub async fn generate_daily_report(&self) -> Result<i64, DomainError> {
        self.daily.generate().await
    }

    pub async fn generate_weekly_report(&self) -> Result<i64, DomainError> {
        self.weekly.generate().await
    }

    pub fn signals(&self, filter: &SignalFilter) -> Result<Vec<Signal>, DomainError> {
        self.signals_uc.list(filter)
    }

    pub fn signal(&self, id: i64) -> Result<Signal, DomainError> {
        self.signals_uc.get(id)
    }

    pub fn update_signal_status(
        &self,
        id: i64,
        status: SignalStatus,
    ) -> Result<Signal, DomainError> {
        self.signals_uc.update_status(id, status)
    }

    pub fn reports(
        &self,
        report_type: Option<ReportType>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ReportListItem>, DomainError> {
        self.reports_uc.list(report_type, limit, offset)
    }

    pub fn report(&self, id: i64) -> Result<GeneratedReport, DomainError> {
        self.reports_uc.detail(id)
    }
}
