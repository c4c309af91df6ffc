//! Configuration validation.
//!
//! Validates all config fields before a backtest runs, so a bad file fails
//! fast instead of mid-simulation.

use crate::domain::error::DiptraderError;
use crate::domain::universe::{parse_symbols, universe_symbols};
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    validate_weeks(config)?;
    validate_initial_cash(config)?;
    validate_symbols(config)?;
    Ok(())
}

pub fn validate_selector_config(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    validate_volatility_band(config)?;
    validate_min_data_points(config)?;
    Ok(())
}

pub fn validate_trading_config(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    validate_thresholds(config)?;
    validate_amounts(config)?;
    Ok(())
}

fn validate_weeks(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    let value = config.get_int("backtest", "weeks", 52);
    if value < 1 {
        return Err(DiptraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "weeks".to_string(),
            reason: "weeks must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    let value = config.get_double("backtest", "initial_cash", 10_000.0);
    if value <= 0.0 {
        return Err(DiptraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_cash".to_string(),
            reason: "initial_cash must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    let symbols = config.get_string("backtest", "symbols");
    let universe = config.get_string("backtest", "universe");

    match (symbols, universe) {
        (Some(s), _) if !s.trim().is_empty() => {
            parse_symbols(&s).map_err(|e| DiptraderError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "symbols".to_string(),
                reason: e.to_string(),
            })?;
            Ok(())
        }
        (_, Some(u)) if !u.trim().is_empty() => {
            universe_symbols(u.trim()).map_err(|e| DiptraderError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "universe".to_string(),
                reason: e.to_string(),
            })?;
            Ok(())
        }
        _ => Err(DiptraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbols".to_string(),
        }),
    }
}

fn validate_volatility_band(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    let min = config.get_double("selector", "min_volatility", 0.01);
    if min < 0.0 {
        return Err(DiptraderError::ConfigInvalid {
            section: "selector".to_string(),
            key: "min_volatility".to_string(),
            reason: "min_volatility must be non-negative".to_string(),
        });
    }
    let max = config.get_double("selector", "max_volatility", 0.5);
    if max <= min {
        return Err(DiptraderError::ConfigInvalid {
            section: "selector".to_string(),
            key: "max_volatility".to_string(),
            reason: "max_volatility must exceed min_volatility".to_string(),
        });
    }
    Ok(())
}

fn validate_min_data_points(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    let value = config.get_int("selector", "min_data_points", 30);
    if value < 2 {
        return Err(DiptraderError::ConfigInvalid {
            section: "selector".to_string(),
            key: "min_data_points".to_string(),
            reason: "min_data_points must be at least 2".to_string(),
        });
    }
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    let buy = config.get_double("trading", "buy_threshold", -0.05);
    if buy > 0.0 {
        return Err(DiptraderError::ConfigInvalid {
            section: "trading".to_string(),
            key: "buy_threshold".to_string(),
            reason: "buy_threshold must be non-positive".to_string(),
        });
    }
    let sell = config.get_double("trading", "sell_threshold", 0.10);
    if sell < 0.0 {
        return Err(DiptraderError::ConfigInvalid {
            section: "trading".to_string(),
            key: "sell_threshold".to_string(),
            reason: "sell_threshold must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_amounts(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    let buy = config.get_double("trading", "buy_amount", 5.0);
    if buy <= 0.0 {
        return Err(DiptraderError::ConfigInvalid {
            section: "trading".to_string(),
            key: "buy_amount".to_string(),
            reason: "buy_amount must be positive".to_string(),
        });
    }
    let sell = config.get_double("trading", "sell_amount", 10.0);
    if sell <= 0.0 {
        return Err(DiptraderError::ConfigInvalid {
            section: "trading".to_string(),
            key: "sell_amount".to_string(),
            reason: "sell_amount must be positive".to_string(),
        });
    }
    Ok(())
}
