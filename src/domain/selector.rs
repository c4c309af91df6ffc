//! Stock suitability filter.
//!
//! Scores each price series by annualized volatility and directional
//! consistency, then gates the trading universe on a blended predictability
//! score. Stocks that are too quiet, too wild, or too short-history are
//! excluded before any signal is generated.

use std::collections::HashMap;

use crate::domain::series::PriceSeries;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// A stock qualifies only if its predictability score clears this.
const MIN_PREDICTABILITY: f64 = 0.3;

/// Filtering criteria, immutable for the lifetime of one selector.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorConfig {
    pub min_volatility: f64,
    pub max_volatility: f64,
    pub min_data_points: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig {
            min_volatility: 0.01,
            max_volatility: 0.5,
            min_data_points: 30,
        }
    }
}

/// Filters stocks into a trading universe by predictability.
#[derive(Debug, Clone, Default)]
pub struct StockSelector {
    config: SelectorConfig,
}

impl StockSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Annualized volatility: sample standard deviation of daily returns
    /// scaled by sqrt(252). None when fewer than two returns exist.
    pub fn volatility(&self, series: &PriceSeries) -> Option<f64> {
        if series.len() < 2 {
            return None;
        }
        let returns = series.returns();
        if returns.len() < 2 {
            return None;
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

        Some(variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt())
    }

    /// Blended predictability score in [0, 1].
    ///
    /// 60% volatility-centeredness (1.0 at the middle of the accepted band,
    /// falling linearly to 0 at either edge, 0 outside the band) plus 40%
    /// return-sign consistency. 0 when the series is too short or has no
    /// measurable volatility.
    pub fn predictability_score(&self, series: &PriceSeries) -> f64 {
        if series.len() < self.config.min_data_points {
            return 0.0;
        }

        let Some(volatility) = self.volatility(series) else {
            return 0.0;
        };

        let volatility_score =
            if volatility < self.config.min_volatility || volatility > self.config.max_volatility {
                0.0
            } else {
                let mid_point = (self.config.min_volatility + self.config.max_volatility) / 2.0;
                let max_distance = (self.config.max_volatility - self.config.min_volatility) / 2.0;
                1.0 - (volatility - mid_point).abs() / max_distance
            };

        let consistency_score = consistency(&series.returns());

        0.6 * volatility_score + 0.4 * consistency_score
    }

    /// Three sequential gates: enough history, volatility inside the band,
    /// predictability above the threshold.
    pub fn is_suitable(&self, series: &PriceSeries) -> bool {
        if series.len() < self.config.min_data_points {
            return false;
        }

        let Some(volatility) = self.volatility(series) else {
            return false;
        };
        if volatility < self.config.min_volatility || volatility > self.config.max_volatility {
            return false;
        }

        self.predictability_score(series) > MIN_PREDICTABILITY
    }

    /// Apply [`Self::is_suitable`] to every series independently. Failing
    /// symbols are silently excluded; the result order is not significant.
    pub fn filter_stocks(&self, stock_data: &HashMap<String, PriceSeries>) -> Vec<String> {
        stock_data
            .iter()
            .filter(|(_, series)| self.is_suitable(series))
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }
}

/// Fraction of consecutive return pairs sharing the same sign.
fn consistency(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.5;
    }
    let same_direction = returns.windows(2).filter(|w| w[0] * w[1] > 0.0).count();
    same_direction as f64 / (returns.len() - 1) as f64
}
