use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "folioscope",
    about = "Portfolio signal synthesis and decision-support reporting"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run all analyzers and persist the resulting signals
    Analyze {
        /// Skip the notification fan-out for this run
        #[arg(long)]
        no_notify: bool,
    },
    /// Generate and persist today's daily report
    DailyReport,
    /// Generate and persist this week's weekly report
    WeeklyReport,
    /// List signals
    Signals {
        /// Filter by signal type (sector, price, macro, smart_money, holding)
        #[arg(long = "type")]
        signal_type: Option<String>,
        /// Filter by sector
        #[arg(long)]
        sector: Option<String>,
        /// Minimum severity (info, low, medium, high, critical)
        #[arg(long)]
        min_severity: Option<String>,
        /// Filter by status (active, read, archived)
        #[arg(long)]
        status: Option<String>,
        /// Include expired signals
        #[arg(long)]
        include_expired: bool,
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// Show a single signal
    Signal {
        /// Signal ID
        id: i64,
    },
    /// Update a signal's status
    MarkSignal {
        /// Signal ID
        id: i64,
        /// New status (active, read, archived)
        status: String,
    },
    /// List generated reports (newest first)
    Reports {
        /// Filter by report type (daily, weekly)
        #[arg(long = "type")]
        report_type: Option<String>,
        #[arg(long, default_value = "20")]
        limit: usize,
        #[arg(long, default_value = "0")]
        offset: usize,
    },
    /// Show a generated report with its full content
    Report {
        /// Report ID
        id: i64,
    },
}
