//! Read-only access to the collaborator-maintained tables: active
//! holdings, the watchlist, and collected daily quotes. This pipeline
//! never writes any of them.

use crate::domain::entities::holding::{Holding, WatchItem};
use crate::domain::error::DomainError;
use crate::domain::ports::holdings_ledger::HoldingsLedger;
use crate::domain::ports::market_data::{MarketDataProvider, Quote};
use crate::domain::values::market::Market;
use crate::domain::values::tier::Tier;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::Mutex;
use tracing::warn;

pub struct SqlitePortfolioStore {
    conn: Mutex<Connection>,
}

impl SqlitePortfolioStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn quote_query(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::types::ToSql],
    ) -> Result<Option<Quote>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params, |row| {
                let close: f64 = row.get(0)?;
                let date_str: String = row.get(1)?;
                Ok((close, date_str))
            })
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()).and_then(|(close, date)| {
            NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .ok()
                .map(|as_of| Quote { close, as_of })
        }))
    }
}

impl HoldingsLedger for SqlitePortfolioStore {
    fn active_holdings(&self) -> Result<Vec<Holding>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT id, symbol, name, market, tier, quantity, avg_cost, stop_loss_price, take_profit_price
                 FROM holdings WHERE status = 'active' ORDER BY id",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let holdings = stmt
            .query_map([], |row| {
                let market_str: String = row.get(3)?;
                let tier_str: String = row.get(4)?;
                Ok(Holding {
                    id: row.get(0)?,
                    symbol: row.get(1)?,
                    name: row.get(2)?,
                    market: market_str.parse().unwrap_or_else(|_| {
                        warn!("invalid market '{market_str}' in holdings row, defaulting to US");
                        Market::Us
                    }),
                    tier: tier_str.parse().unwrap_or_else(|_| {
                        warn!("invalid tier '{tier_str}' in holdings row, defaulting to medium");
                        Tier::Medium
                    }),
                    quantity: row.get(5)?,
                    avg_cost: row.get(6)?,
                    stop_loss_price: row.get(7)?,
                    take_profit_price: row.get(8)?,
                })
            })
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(holdings)
    }

    fn watchlist(&self) -> Result<Vec<WatchItem>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT symbol, name, market, theme, target_price FROM watchlist ORDER BY id")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let items = stmt
            .query_map([], |row| {
                let market_str: String = row.get(2)?;
                Ok(WatchItem {
                    symbol: row.get(0)?,
                    name: row.get(1)?,
                    market: market_str.parse().unwrap_or(Market::Us),
                    theme: row.get(3)?,
                    target_price: row.get(4)?,
                })
            })
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(items)
    }
}

impl MarketDataProvider for SqlitePortfolioStore {
    fn latest_quote(&self, symbol: &str, market: Market) -> Result<Option<Quote>, DomainError> {
        self.quote_query(
            "SELECT close, trade_date FROM daily_quotes
             WHERE symbol = ?1 AND market = ?2 AND close IS NOT NULL
             ORDER BY trade_date DESC LIMIT 1",
            params![symbol, market.to_string()],
        )
    }

    fn prior_close(&self, symbol: &str, market: Market) -> Result<Option<Quote>, DomainError> {
        self.quote_query(
            "SELECT close, trade_date FROM daily_quotes
             WHERE symbol = ?1 AND market = ?2 AND close IS NOT NULL
             ORDER BY trade_date DESC LIMIT 1 OFFSET 1",
            params![symbol, market.to_string()],
        )
    }

    fn close_at_or_before(
        &self,
        symbol: &str,
        market: Market,
        date: NaiveDate,
    ) -> Result<Option<Quote>, DomainError> {
        self.quote_query(
            "SELECT close, trade_date FROM daily_quotes
             WHERE symbol = ?1 AND market = ?2 AND close IS NOT NULL AND trade_date <= ?3
             ORDER BY trade_date DESC LIMIT 1",
            params![
                symbol,
                market.to_string(),
                date.format("%Y-%m-%d").to_string()
            ],
        )
    }
}
