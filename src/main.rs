use clap::Parser;
use folioscope::cli::commands::{Cli, Commands};
use folioscope::domain::ports::signal_repository::SignalFilter;
use folioscope::domain::values::report_type::ReportType;
use folioscope::domain::values::severity::Severity;
use folioscope::domain::values::signal_status::SignalStatus;
use folioscope::domain::values::signal_type::SignalType;
use folioscope::Folioscope;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let db_path = std::env::var("FOLIOSCOPE_DB").unwrap_or_else(|_| "./folioscope.db".into());

    let fs = match Folioscope::new(&db_path) {
        Ok(fs) => fs,
        Err(e) => {
            eprintln!("Error initializing folioscope: {e}");
            std::process::exit(1);
        }
    };

    let result = run_command(fs, cli.command).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(fs: Folioscope, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Analyze { no_notify } => {
            if no_notify {
                let run = fs.run_analyzers()?;
                println!("{}", serde_json::to_string_pretty(&run)?);
            } else {
                let outcome = fs.run_analyzers_with_notifications().await?;
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
        }
        Commands::DailyReport => {
            let id = fs.generate_daily_report().await?;
            println!("Daily report generated, id={id}");
        }
        Commands::WeeklyReport => {
            let id = fs.generate_weekly_report().await?;
            println!("Weekly report generated, id={id}");
        }
        Commands::Signals {
            signal_type,
            sector,
            min_severity,
            status,
            include_expired,
            limit,
        } => {
            let filter = SignalFilter {
                signal_type: signal_type
                    .map(|s| s.parse::<SignalType>())
                    .transpose()
                    .map_err(|e: String| e)?,
                sector,
                min_severity: min_severity
                    .map(|s| s.parse::<Severity>())
                    .transpose()
                    .map_err(|e: String| e)?,
                status: status
                    .map(|s| s.parse::<SignalStatus>())
                    .transpose()
                    .map_err(|e: String| e)?,
                since: None,
                include_expired,
                limit: Some(limit),
            };
            let signals = fs.signals(&filter)?;
            println!("{}", serde_json::to_string_pretty(&signals)?);
        }
        Commands::Signal { id } => {
            let signal = fs.signal(id)?;
            println!("{}", serde_json::to_string_pretty(&signal)?);
        }
        Commands::MarkSignal { id, status } => {
            let status: SignalStatus = status.parse().map_err(|e: String| e)?;
            let signal = fs.update_signal_status(id, status)?;
            println!("{}", serde_json::to_string_pretty(&signal)?);
        }
        Commands::Reports {
            report_type,
            limit,
            offset,
        } => {
            let report_type = report_type
                .map(|s| s.parse::<ReportType>())
                .transpose()
                .map_err(|e: String| e)?;
            let reports = fs.reports(report_type, limit, offset)?;
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        Commands::Report { id } => {
            let report = fs.report(id)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
