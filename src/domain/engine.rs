//! Trading engine: weekly-change signals with fixed dollar sizing.
//!
//! Buy a fixed dollar amount when a stock drops past the buy threshold over
//! the trailing week, sell a fixed amount when it rises past the sell
//! threshold, otherwise hold.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::series::PriceSeries;

/// "One week" measured in observations, not calendar days. The backtest
/// driver steps positionally by the same count.
const WEEK_OBSERVATIONS: usize = 7;

/// Reference prices with smaller magnitude are treated as missing.
const PRICE_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// Threshold and sizing parameters, immutable for one engine instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TradingConfig {
    /// Weekly change at or below this triggers a buy. Non-positive.
    pub buy_threshold: f64,
    /// Weekly change at or above this triggers a sell. Non-negative.
    pub sell_threshold: f64,
    pub buy_amount: f64,
    pub sell_amount: f64,
}

impl Default for TradingConfig {
    fn default() -> Self {
        TradingConfig {
            buy_threshold: -0.05,
            sell_threshold: 0.10,
            buy_amount: 5.0,
            sell_amount: 10.0,
        }
    }
}

/// A non-hold decision for one symbol at one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeDecision {
    pub signal: Signal,
    pub amount: f64,
    pub shares: f64,
    pub price: f64,
    pub weekly_change: Option<f64>,
}

/// Counts and dollar totals over one batch of decisions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TradeSummary {
    pub total_buys: usize,
    pub total_sells: usize,
    pub buy_value: f64,
    pub sell_value: f64,
    pub net_position: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TradingEngine {
    config: TradingConfig,
}

impl TradingEngine {
    pub fn new(config: TradingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TradingConfig {
        &self.config
    }

    /// Percentage change between the latest price and the price seven
    /// observations earlier (or the earliest available when the series is
    /// shorter). None when fewer than two points exist, when either endpoint
    /// is non-finite, or when the reference price is effectively zero.
    pub fn weekly_change(&self, series: &PriceSeries) -> Option<f64> {
        if series.len() < 2 {
            return None;
        }

        let points = series.points();
        let current = points[points.len() - 1].price;
        let reference = if points.len() >= WEEK_OBSERVATIONS {
            points[points.len() - WEEK_OBSERVATIONS].price
        } else {
            points[0].price
        };

        if !current.is_finite() || !reference.is_finite() || reference.abs() < PRICE_EPSILON {
            return None;
        }

        Some((current - reference) / reference)
    }

    /// Map a series to (signal, dollar amount, weekly change). The buy
    /// branch is checked before the sell branch; both thresholds are
    /// inclusive.
    pub fn generate_signal(&self, series: &PriceSeries) -> (Signal, f64, Option<f64>) {
        let Some(change) = self.weekly_change(series) else {
            return (Signal::Hold, 0.0, None);
        };

        if change <= self.config.buy_threshold {
            (Signal::Buy, self.config.buy_amount, Some(change))
        } else if change >= self.config.sell_threshold {
            (Signal::Sell, self.config.sell_amount, Some(change))
        } else {
            (Signal::Hold, 0.0, Some(change))
        }
    }

    /// Evaluate every series and return the non-hold decisions keyed by
    /// symbol. Hold symbols are omitted entirely.
    pub fn execute_trades(
        &self,
        stock_data: &HashMap<String, PriceSeries>,
    ) -> HashMap<String, TradeDecision> {
        let mut trades = HashMap::new();

        for (symbol, series) in stock_data {
            let (signal, amount, weekly_change) = self.generate_signal(series);
            if signal == Signal::Hold {
                continue;
            }

            let Some(price) = series.latest_price() else {
                continue;
            };
            let shares = if price.is_finite() && price.abs() > PRICE_EPSILON {
                amount / price
            } else {
                0.0
            };

            trades.insert(
                symbol.clone(),
                TradeDecision {
                    signal,
                    amount,
                    shares,
                    price,
                    weekly_change,
                },
            );
        }

        trades
    }

    /// Partition decisions by side and total the dollar amounts.
    pub fn trade_summary(&self, trades: &HashMap<String, TradeDecision>) -> TradeSummary {
        let mut summary = TradeSummary::default();

        for trade in trades.values() {
            match trade.signal {
                Signal::Buy => {
                    summary.total_buys += 1;
                    summary.buy_value += trade.amount;
                }
                Signal::Sell => {
                    summary.total_sells += 1;
                    summary.sell_value += trade.amount;
                }
                Signal::Hold => {}
            }
        }

        summary.net_position = summary.sell_value - summary.buy_value;
        summary
    }
}
