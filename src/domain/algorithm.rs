//! Composition of the suitability filter and the trading engine.
//!
//! One evaluation: filter the input map down to suitable stocks, generate
//! decisions for those, and summarize. The backtest driver calls this once
//! per simulated week on a growing data window.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::engine::{Signal, TradeDecision, TradeSummary, TradingConfig, TradingEngine};
use crate::domain::selector::{SelectorConfig, StockSelector};
use crate::domain::series::PriceSeries;

/// Result of one full evaluation over a stock data map.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmRun {
    pub suitable_stocks: Vec<String>,
    pub trades: HashMap<String, TradeDecision>,
    pub summary: TradeSummary,
}

/// Single-stock diagnostic view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockAnalysis {
    pub symbol: String,
    pub suitable: bool,
    pub predictability_score: f64,
    pub volatility: Option<f64>,
    pub signal: Signal,
    pub amount: f64,
    pub weekly_change: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct TradingAlgorithm {
    selector: StockSelector,
    engine: TradingEngine,
}

impl TradingAlgorithm {
    pub fn new(selector_config: SelectorConfig, trading_config: TradingConfig) -> Self {
        Self {
            selector: StockSelector::new(selector_config),
            engine: TradingEngine::new(trading_config),
        }
    }

    pub fn selector(&self) -> &StockSelector {
        &self.selector
    }

    pub fn engine(&self) -> &TradingEngine {
        &self.engine
    }

    /// Filter, trade, summarize.
    pub fn run(&self, stock_data: &HashMap<String, PriceSeries>) -> AlgorithmRun {
        let suitable_stocks = self.selector.filter_stocks(stock_data);

        let filtered: HashMap<String, PriceSeries> = suitable_stocks
            .iter()
            .filter_map(|symbol| {
                stock_data
                    .get(symbol)
                    .map(|series| (symbol.clone(), series.clone()))
            })
            .collect();

        let trades = self.engine.execute_trades(&filtered);
        let summary = self.engine.trade_summary(&trades);

        AlgorithmRun {
            suitable_stocks,
            trades,
            summary,
        }
    }

    /// Evaluate one stock regardless of whether it would pass the filter.
    pub fn analyze_stock(&self, symbol: &str, series: &PriceSeries) -> StockAnalysis {
        let (signal, amount, weekly_change) = self.engine.generate_signal(series);

        StockAnalysis {
            symbol: symbol.to_string(),
            suitable: self.selector.is_suitable(series),
            predictability_score: self.selector.predictability_score(series),
            volatility: self.selector.volatility(series),
            signal,
            amount,
            weekly_change,
        }
    }
}
