pub mod advisory;
pub mod analyzer;
pub mod holdings_ledger;
pub mod macro_data;
pub mod market_data;
pub mod notifier;
pub mod report_repository;
pub mod signal_repository;
