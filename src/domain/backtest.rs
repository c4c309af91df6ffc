//! Backtest driver: weekly stepping over a unified timeline.
//!
//! Each step the driver rebuilds the "as of" view of every series, re-runs
//! the filter and the signal generator from scratch on that window, applies
//! the resulting trades to the ledger, and snapshots. Skipped trades
//! (unaffordable buys, sells capped to zero) are silent; only a timeline
//! that is too short or a run that never advances is fatal.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::algorithm::TradingAlgorithm;
use crate::domain::engine::Signal;
use crate::domain::error::DiptraderError;
use crate::domain::portfolio::{Portfolio, PortfolioSnapshot};
use crate::domain::series::PriceSeries;

/// Minimum distinct dates across all series for a run to start.
pub const MIN_TIMELINE_DATES: usize = 14;

/// Positional stride per simulated week. Matches the signal generator's
/// seven-observations-back lookback.
const STEP_OBSERVATIONS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeAction {
    Buy,
    Sell,
}

/// One executed (non-skipped) trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeLogEntry {
    pub date: NaiveDate,
    pub symbol: String,
    pub action: TradeAction,
    pub shares: f64,
    pub price: f64,
    pub amount: f64,
    pub weekly_change: f64,
}

/// Aggregate result of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestSummary {
    pub initial_value: f64,
    pub final_value: f64,
    pub total_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub total_trades: usize,
    pub buy_trades: usize,
    pub sell_trades: usize,
    pub portfolio_history: Vec<PortfolioSnapshot>,
    pub trade_log: Vec<TradeLogEntry>,
    pub final_holdings: HashMap<String, f64>,
}

/// Simulates the trading algorithm week by week over historical data.
///
/// Owns its ledger exclusively; concurrent backtests each construct their
/// own `Backtester`.
#[derive(Debug)]
pub struct Backtester {
    weeks: usize,
    algorithm: TradingAlgorithm,
    portfolio: Portfolio,
    trade_log: Vec<TradeLogEntry>,
}

impl Backtester {
    pub fn new(weeks: usize, initial_cash: f64) -> Self {
        Self::with_algorithm(weeks, initial_cash, TradingAlgorithm::default())
    }

    pub fn with_algorithm(weeks: usize, initial_cash: f64, algorithm: TradingAlgorithm) -> Self {
        Backtester {
            weeks,
            algorithm,
            portfolio: Portfolio::new(initial_cash),
            trade_log: Vec::new(),
        }
    }

    /// Run the simulation to completion and reduce the snapshot history
    /// into summary statistics.
    pub fn run(
        mut self,
        stock_data: &HashMap<String, PriceSeries>,
    ) -> Result<BacktestSummary, DiptraderError> {
        let all_dates = unified_timeline(stock_data);
        if all_dates.len() < MIN_TIMELINE_DATES {
            return Err(DiptraderError::InsufficientData {
                dates: all_dates.len(),
                minimum: MIN_TIMELINE_DATES,
            });
        }

        // Initial snapshot at the earliest date; symbols without a price on
        // exactly that date are omitted from the price map, not zeroed.
        let start_date = all_dates[0];
        let initial_prices: HashMap<String, f64> = stock_data
            .iter()
            .filter_map(|(symbol, series)| {
                series.price_at(start_date).map(|p| (symbol.clone(), p))
            })
            .collect();
        self.portfolio.record_state(start_date, &initial_prices);

        let mut weeks_processed = 0;
        let mut i = STEP_OBSERVATIONS; // one week of history before trading

        while i < all_dates.len() && weeks_processed < self.weeks {
            let current_date = all_dates[i];
            self.step(stock_data, current_date);

            i += STEP_OBSERVATIONS;
            weeks_processed += 1;
        }

        if self.portfolio.history.len() < 2 {
            return Err(DiptraderError::EmptyHistory);
        }

        Ok(self.summarize())
    }

    /// One simulated week: window the data, evaluate the algorithm, apply
    /// trades, snapshot. Does nothing when no series has data yet.
    fn step(&mut self, stock_data: &HashMap<String, PriceSeries>, current_date: NaiveDate) {
        let mut window_data: HashMap<String, PriceSeries> = HashMap::new();
        for (symbol, series) in stock_data {
            let window = series.up_to(current_date);
            if !window.is_empty() {
                window_data.insert(symbol.clone(), window);
            }
        }
        if window_data.is_empty() {
            return;
        }

        let result = self.algorithm.run(&window_data);

        let current_prices: HashMap<String, f64> = window_data
            .iter()
            .filter_map(|(symbol, window)| window.latest_price().map(|p| (symbol.clone(), p)))
            .collect();

        for (symbol, decision) in &result.trades {
            let Some(&price) = current_prices.get(symbol) else {
                continue;
            };
            let Some(weekly_change) = decision.weekly_change else {
                continue;
            };

            match decision.signal {
                Signal::Buy => {
                    let shares = decision.amount / price;
                    if self.portfolio.buy(symbol, shares, price) {
                        self.trade_log.push(TradeLogEntry {
                            date: current_date,
                            symbol: symbol.clone(),
                            action: TradeAction::Buy,
                            shares,
                            price,
                            amount: decision.amount,
                            weekly_change,
                        });
                    }
                }
                Signal::Sell => {
                    let held = self.portfolio.shares_held(symbol);
                    if held <= 0.0 {
                        continue;
                    }
                    // never attempt to sell more than is held
                    let shares = (decision.amount / price).min(held);
                    if self.portfolio.sell(symbol, shares, price) {
                        self.trade_log.push(TradeLogEntry {
                            date: current_date,
                            symbol: symbol.clone(),
                            action: TradeAction::Sell,
                            shares,
                            price,
                            amount: shares * price,
                            weekly_change,
                        });
                    }
                }
                Signal::Hold => {}
            }
        }

        self.portfolio.record_state(current_date, &current_prices);
    }

    fn summarize(self) -> BacktestSummary {
        let history = self.portfolio.history;
        let initial_value = history[0].total_value;
        let final_value = history[history.len() - 1].total_value;
        let total_return_pct = (final_value - initial_value) / initial_value * 100.0;
        let max_drawdown_pct = max_drawdown(&history) * 100.0;

        let buy_trades = self
            .trade_log
            .iter()
            .filter(|t| t.action == TradeAction::Buy)
            .count();
        let sell_trades = self.trade_log.len() - buy_trades;

        BacktestSummary {
            initial_value,
            final_value,
            total_return_pct,
            max_drawdown_pct,
            total_trades: self.trade_log.len(),
            buy_trades,
            sell_trades,
            portfolio_history: history,
            trade_log: self.trade_log,
            final_holdings: self.portfolio.holdings,
        }
    }
}

/// Sorted union of all observation dates across all series.
pub fn unified_timeline(stock_data: &HashMap<String, PriceSeries>) -> Vec<NaiveDate> {
    let unique_dates: BTreeSet<NaiveDate> = stock_data
        .values()
        .flat_map(|series| series.points().iter().map(|p| p.date))
        .collect();
    unique_dates.into_iter().collect()
}

/// Largest relative decline from the running peak, as a fraction.
fn max_drawdown(history: &[PortfolioSnapshot]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }

    let mut peak = history[0].total_value;
    let mut max_dd = 0.0_f64;
    for snapshot in history {
        if snapshot.total_value > peak {
            peak = snapshot.total_value;
        }
        if peak > 0.0 {
            let dd = (peak - snapshot.total_value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}
