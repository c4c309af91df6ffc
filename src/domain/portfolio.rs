//! Portfolio ledger: cash, per-symbol share balances, snapshot history.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

/// Residual share balances below this are removed entirely.
const DUST_THRESHOLD: f64 = 1e-10;

/// Immutable record of the portfolio at one simulated date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSnapshot {
    pub date: NaiveDate,
    pub cash: f64,
    pub holdings_value: f64,
    pub total_value: f64,
    pub holdings: HashMap<String, f64>,
}

/// Mutable ledger owned exclusively by one backtest run.
///
/// Buys and sells that violate the cash or holdings constraints return
/// false without mutating anything; callers treat that as a skipped trade,
/// not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub holdings: HashMap<String, f64>,
    pub history: Vec<PortfolioSnapshot>,
}

impl Portfolio {
    pub fn new(initial_cash: f64) -> Self {
        Portfolio {
            cash: initial_cash,
            holdings: HashMap::new(),
            history: Vec::new(),
        }
    }

    /// Buy `shares` at `price`. Succeeds only when the full cost is covered
    /// by cash on hand.
    pub fn buy(&mut self, symbol: &str, shares: f64, price: f64) -> bool {
        let cost = shares * price;
        if cost > self.cash {
            return false;
        }
        self.cash -= cost;
        *self.holdings.entry(symbol.to_string()).or_insert(0.0) += shares;
        true
    }

    /// Sell `shares` at `price`. Succeeds only when at least that many
    /// shares are held; a dust remainder drops the holding entirely.
    pub fn sell(&mut self, symbol: &str, shares: f64, price: f64) -> bool {
        let Some(held) = self.holdings.get_mut(symbol) else {
            return false;
        };
        if *held < shares {
            return false;
        }

        self.cash += shares * price;
        *held -= shares;
        if *held < DUST_THRESHOLD {
            self.holdings.remove(symbol);
        }
        true
    }

    pub fn shares_held(&self, symbol: &str) -> f64 {
        self.holdings.get(symbol).copied().unwrap_or(0.0)
    }

    /// Cash plus the marked value of all holdings. A symbol missing from
    /// `current_prices` contributes zero.
    pub fn value(&self, current_prices: &HashMap<String, f64>) -> f64 {
        let holdings_value: f64 = self
            .holdings
            .iter()
            .map(|(symbol, shares)| shares * current_prices.get(symbol).copied().unwrap_or(0.0))
            .sum();
        self.cash + holdings_value
    }

    /// Record a snapshot at `date` and append it to the history. The
    /// snapshot's holdings map is a copy and never aliases the live ledger.
    pub fn record_state(&mut self, date: NaiveDate, current_prices: &HashMap<String, f64>) {
        let total_value = self.value(current_prices);
        let holdings_value = total_value - self.cash;

        self.history.push(PortfolioSnapshot {
            date,
            cash: self.cash,
            holdings_value,
            total_value,
            holdings: self.holdings.clone(),
        });
    }
}
