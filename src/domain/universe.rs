//! Symbol universes: named symbol lists and ad-hoc symbol parsing.
//!
//! A universe is resolved to price data through the data port; symbols that
//! fail to load are skipped with a warning rather than aborting the run.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::domain::error::DiptraderError;
use crate::domain::series::PriceSeries;
use crate::ports::data_port::DataPort;

/// Predefined universes, addressable by name from the CLI and config.
pub const UNIVERSES: &[(&str, &[&str])] = &[
    (
        "default",
        &["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA", "META", "NVDA", "JPM"],
    ),
    (
        "tech",
        &[
            "AAPL", "GOOGL", "MSFT", "META", "NVDA", "AMD", "INTC", "CSCO", "ORCL", "IBM",
        ],
    ),
    (
        "finance",
        &["JPM", "BAC", "WFC", "GS", "MS", "C", "USB", "PNC", "TFC", "COF"],
    ),
    (
        "energy",
        &["XOM", "CVX", "COP", "SLB", "EOG", "MPC", "PSX", "VLO", "OXY", "HAL"],
    ),
    (
        "healthcare",
        &["JNJ", "UNH", "PFE", "MRK", "ABBV", "TMO", "DHR", "ABT", "LLY", "BMY"],
    ),
    (
        "consumer",
        &["AMZN", "WMT", "HD", "MCD", "NKE", "SBUX", "TGT", "LOW", "TJX", "COST"],
    ),
    ("small", &["AAPL", "MSFT", "GOOGL"]),
];

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("unknown universe: {0}")]
    UnknownUniverse(String),
}

pub fn universe_names() -> Vec<&'static str> {
    UNIVERSES.iter().map(|(name, _)| *name).collect()
}

pub fn universe_symbols(name: &str) -> Result<Vec<String>, UniverseError> {
    UNIVERSES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, symbols)| symbols.iter().map(|s| s.to_string()).collect())
        .ok_or_else(|| UniverseError::UnknownUniverse(name.to_string()))
}

/// Parse a comma-separated symbol list. Tokens are trimmed and uppercased;
/// empty tokens and duplicates are rejected.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if seen.contains(&symbol) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        seen.insert(symbol.clone());
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// Fetch price data for every symbol, skipping symbols that fail to load
/// or come back empty. Errors only when nothing at all could be fetched.
pub fn fetch_universe(
    data_port: &dyn DataPort,
    symbols: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<HashMap<String, PriceSeries>, DiptraderError> {
    let mut stock_data = HashMap::new();

    for symbol in symbols {
        let series = match data_port.fetch_prices(symbol, start_date, end_date) {
            Ok(series) => series,
            Err(e) => {
                eprintln!("Warning: skipping {} ({})", symbol, e);
                continue;
            }
        };

        if series.is_empty() {
            eprintln!("Warning: skipping {} (no data found)", symbol);
            continue;
        }

        eprintln!("  {}: {} observations [OK]", symbol, series.len());
        stock_data.insert(symbol.clone(), series);
    }

    if stock_data.is_empty() {
        return Err(DiptraderError::Data {
            reason: "no price data could be loaded for any requested symbol".to_string(),
        });
    }

    if stock_data.len() < symbols.len() {
        eprintln!("Loaded {} of {} symbols", stock_data.len(), symbols.len());
    }

    Ok(stock_data)
}
