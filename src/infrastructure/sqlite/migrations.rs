use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS signals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            signal_type TEXT NOT NULL,
            sector TEXT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            severity TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            source TEXT NOT NULL,
            data TEXT NOT NULL DEFAULT '{}',
            related_symbols TEXT NOT NULL DEFAULT '[]',
            telegram_sent INTEGER NOT NULL DEFAULT 0,
            telegram_sent_at TEXT,
            created_at TEXT NOT NULL,
            expires_at TEXT
        );

        CREATE TABLE IF NOT EXISTS generated_reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            report_type TEXT NOT NULL,
            report_date TEXT NOT NULL,
            generated_at TEXT NOT NULL,
            summary TEXT NOT NULL,
            content TEXT NOT NULL
        );

        -- Read-side tables maintained by the holdings ledger and the
        -- market/macro collectors. Created here so a fresh database works.
        CREATE TABLE IF NOT EXISTS holdings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            symbol TEXT NOT NULL,
            name TEXT NOT NULL DEFAULT '',
            market TEXT NOT NULL,
            tier TEXT NOT NULL,
            quantity REAL NOT NULL,
            avg_cost REAL NOT NULL,
            stop_loss_price REAL,
            take_profit_price REAL,
            status TEXT NOT NULL DEFAULT 'active'
        );

        CREATE TABLE IF NOT EXISTS watchlist (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            symbol TEXT NOT NULL,
            name TEXT NOT NULL DEFAULT '',
            market TEXT NOT NULL,
            theme TEXT,
            target_price REAL
        );

        CREATE TABLE IF NOT EXISTS daily_quotes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            symbol TEXT NOT NULL,
            market TEXT NOT NULL,
            trade_date TEXT NOT NULL,
            close REAL
        );

        CREATE TABLE IF NOT EXISTS macro_indicators (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            series_id TEXT NOT NULL,
            date TEXT NOT NULL,
            value REAL NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_signals_created ON signals(created_at);
        CREATE INDEX IF NOT EXISTS idx_signals_status ON signals(status);
        CREATE INDEX IF NOT EXISTS idx_reports_type_time
            ON generated_reports(report_type, generated_at);
        CREATE INDEX IF NOT EXISTS idx_holdings_status ON holdings(status);
        CREATE INDEX IF NOT EXISTS idx_quotes_lookup
            ON daily_quotes(symbol, market, trade_date);
        CREATE INDEX IF NOT EXISTS idx_macro_series ON macro_indicators(series_id, date);
        ",
    )
    .map_err(|e| format!("Migration failed: {e}"))
}
