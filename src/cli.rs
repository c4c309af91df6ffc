//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report::JsonReport;
use crate::domain::algorithm::TradingAlgorithm;
use crate::domain::backtest::{BacktestSummary, Backtester, TradeAction};
use crate::domain::config_validation::{
    validate_backtest_config, validate_selector_config, validate_trading_config,
};
use crate::domain::engine::TradingConfig;
use crate::domain::error::DiptraderError;
use crate::domain::selector::SelectorConfig;
use crate::domain::universe::{fetch_universe, parse_symbols, universe_names, universe_symbols};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "diptrader", about = "Threshold-driven weekly trading backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory of {SYMBOL}.csv price files (overrides config)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        /// Comma-separated symbol list (overrides config)
        #[arg(short, long)]
        symbols: Option<String>,
        /// Named universe, e.g. tech or finance (overrides config)
        #[arg(short, long)]
        universe: Option<String>,
        /// Number of weeks to simulate (overrides config)
        #[arg(short, long)]
        weeks: Option<usize>,
        /// Starting cash (overrides config)
        #[arg(long)]
        cash: Option<f64>,
        /// Write a JSON report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols with data available
    ListSymbols {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Show data range for symbol(s)
    Info {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// List the predefined universes
    ListUniverses,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data_dir,
            symbols,
            universe,
            weeks,
            cash,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, symbols.as_deref(), universe.as_deref())
            } else {
                run_backtest(
                    &config,
                    data_dir.as_ref(),
                    symbols.as_deref(),
                    universe.as_deref(),
                    weeks,
                    cash,
                    output.as_ref(),
                )
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config, data_dir } => {
            run_list_symbols(config.as_ref(), data_dir.as_ref())
        }
        Command::Info {
            symbol,
            config,
            data_dir,
        } => run_info(symbol.as_deref(), config.as_ref(), data_dir.as_ref()),
        Command::ListUniverses => run_list_universes(),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = DiptraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_selector_config(adapter: &dyn ConfigPort) -> SelectorConfig {
    SelectorConfig {
        min_volatility: adapter.get_double("selector", "min_volatility", 0.01),
        max_volatility: adapter.get_double("selector", "max_volatility", 0.5),
        min_data_points: adapter.get_int("selector", "min_data_points", 30) as usize,
    }
}

pub fn build_trading_config(adapter: &dyn ConfigPort) -> TradingConfig {
    TradingConfig {
        buy_threshold: adapter.get_double("trading", "buy_threshold", -0.05),
        sell_threshold: adapter.get_double("trading", "sell_threshold", 0.10),
        buy_amount: adapter.get_double("trading", "buy_amount", 5.0),
        sell_amount: adapter.get_double("trading", "sell_amount", 10.0),
    }
}

/// Symbol resolution order: --symbols, --universe, config symbols, config
/// universe. CLI overrides always win.
pub fn resolve_symbols(
    symbols_override: Option<&str>,
    universe_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, DiptraderError> {
    if let Some(s) = symbols_override {
        return parse_symbols(s).map_err(|e| DiptraderError::Data {
            reason: e.to_string(),
        });
    }
    if let Some(u) = universe_override {
        return universe_symbols(u).map_err(|e| DiptraderError::Data {
            reason: e.to_string(),
        });
    }
    if let Some(s) = config
        .get_string("backtest", "symbols")
        .filter(|s| !s.trim().is_empty())
    {
        return parse_symbols(&s).map_err(|e| DiptraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "symbols".into(),
            reason: e.to_string(),
        });
    }
    if let Some(u) = config
        .get_string("backtest", "universe")
        .filter(|u| !u.trim().is_empty())
    {
        return universe_symbols(u.trim()).map_err(|e| DiptraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "universe".into(),
            reason: e.to_string(),
        });
    }
    Err(DiptraderError::ConfigMissing {
        section: "backtest".into(),
        key: "symbols".into(),
    })
}

fn resolve_data_dir(
    data_dir_override: Option<&PathBuf>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, DiptraderError> {
    if let Some(dir) = data_dir_override {
        return Ok(dir.clone());
    }
    config
        .get_string("data", "path")
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| DiptraderError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })
}

fn resolve_dates(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), DiptraderError> {
    let parse = |key: &str, value: String| {
        NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| DiptraderError::ConfigInvalid {
            section: "backtest".into(),
            key: key.into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        })
    };

    let start = match config.get_string("backtest", "start_date") {
        Some(s) => parse("start_date", s)?,
        None => NaiveDate::MIN,
    };
    let end = match config.get_string("backtest", "end_date") {
        Some(s) => parse("end_date", s)?,
        None => NaiveDate::MAX,
    };

    if start >= end {
        return Err(DiptraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "start_date".into(),
            reason: "start_date must be before end_date".into(),
        });
    }
    Ok((start, end))
}

#[allow(clippy::too_many_arguments)]
fn run_backtest(
    config_path: &PathBuf,
    data_dir_override: Option<&PathBuf>,
    symbols_override: Option<&str>,
    universe_override: Option<&str>,
    weeks_override: Option<usize>,
    cash_override: Option<f64>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter)
        .and_then(|()| validate_selector_config(&adapter))
        .and_then(|()| validate_trading_config(&adapter))
    {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let symbols = match resolve_symbols(symbols_override, universe_override, &adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_dir = match resolve_data_dir(data_dir_override, &adapter) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let (start_date, end_date) = match resolve_dates(&adapter) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let weeks = weeks_override.unwrap_or(adapter.get_int("backtest", "weeks", 52) as usize);
    let initial_cash = cash_override.unwrap_or(adapter.get_double("backtest", "initial_cash", 10_000.0));

    let algorithm = TradingAlgorithm::new(
        build_selector_config(&adapter),
        build_trading_config(&adapter),
    );

    let data_port = CsvAdapter::new(data_dir);

    eprintln!("Loading price data for {} symbols...", symbols.len());
    let stock_data = match fetch_universe(&data_port, &symbols, start_date, end_date) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Running backtest: {} symbols, {} weeks, ${:.2} starting cash",
        stock_data.len(),
        weeks,
        initial_cash,
    );

    let backtester = Backtester::with_algorithm(weeks, initial_cash, algorithm);
    let summary = match backtester.run(&stock_data) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_summary(&summary);

    if let Some(output) = output_path {
        let output_str = output.display().to_string();
        if let Err(e) = JsonReport.write(&summary, &output_str) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("\nReport written to: {}", output_str);
    }

    ExitCode::SUCCESS
}

fn print_summary(summary: &BacktestSummary) {
    eprintln!("\n=== Backtest Results ===");
    eprintln!("Initial Value:    ${:.2}", summary.initial_value);
    eprintln!("Final Value:      ${:.2}", summary.final_value);
    eprintln!("Total Return:     {:.2}%", summary.total_return_pct);
    eprintln!("Max Drawdown:     -{:.1}%", summary.max_drawdown_pct);
    eprintln!(
        "Total Trades:     {} ({} buys, {} sells)",
        summary.total_trades, summary.buy_trades, summary.sell_trades,
    );

    if !summary.final_holdings.is_empty() {
        eprintln!("\n=== Final Holdings ===");
        let mut holdings: Vec<_> = summary.final_holdings.iter().collect();
        holdings.sort_by(|a, b| a.0.cmp(b.0));
        for (symbol, shares) in holdings {
            eprintln!("  {}: {:.4} shares", symbol, shares);
        }
    }

    if !summary.trade_log.is_empty() {
        eprintln!("\n=== Recent Trades ===");
        let recent = summary.trade_log.iter().rev().take(10).rev();
        for trade in recent {
            let action = match trade.action {
                TradeAction::Buy => "BUY ",
                TradeAction::Sell => "SELL",
            };
            eprintln!(
                "  {} {} {} {:.4} @ ${:.2} ({:+.1}% weekly)",
                trade.date,
                action,
                trade.symbol,
                trade.shares,
                trade.price,
                trade.weekly_change * 100.0,
            );
        }
    }
}

pub fn run_dry_run(
    config_path: &PathBuf,
    symbols_override: Option<&str>,
    universe_override: Option<&str>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter)
        .and_then(|()| validate_selector_config(&adapter))
        .and_then(|()| validate_trading_config(&adapter))
    {
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!("Config validated successfully");

    let selector = build_selector_config(&adapter);
    let trading = build_trading_config(&adapter);

    eprintln!("\nSelector:");
    eprintln!("  volatility band: [{}, {}]", selector.min_volatility, selector.max_volatility);
    eprintln!("  min data points: {}", selector.min_data_points);

    eprintln!("\nTrading:");
    eprintln!("  buy:  change <= {} for ${}", trading.buy_threshold, trading.buy_amount);
    eprintln!("  sell: change >= {} for ${}", trading.sell_threshold, trading.sell_amount);

    match resolve_symbols(symbols_override, universe_override, &adapter) {
        Ok(symbols) => {
            eprintln!("\nSymbols: {}", symbols.join(", "));
        }
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    type Check = fn(&dyn ConfigPort) -> Result<(), DiptraderError>;
    let checks: [(&str, Check); 3] = [
        ("backtest", validate_backtest_config),
        ("selector", validate_selector_config),
        ("trading", validate_trading_config),
    ];
    for (name, validate) in checks {
        match validate(&adapter) {
            Ok(()) => eprintln!("  [{}] ok", name),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: Option<&PathBuf>, data_dir: Option<&PathBuf>) -> ExitCode {
    let data_port = match data_port_from(config_path, data_dir) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let symbols = match data_port.list_symbols() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_info(
    symbol: Option<&str>,
    config_path: Option<&PathBuf>,
    data_dir: Option<&PathBuf>,
) -> ExitCode {
    let data_port = match data_port_from(config_path, data_dir) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let symbols = match symbol {
        Some(s) => vec![s.to_uppercase()],
        None => match data_port.list_symbols() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
    };

    for s in &symbols {
        match data_port.get_data_range(s) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{}: {} observations, {} to {}", s, count, min_date, max_date);
            }
            Ok(None) => {
                eprintln!("{}: no data found", s);
            }
            Err(e) => {
                eprintln!("error querying {}: {}", s, e);
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_list_universes() -> ExitCode {
    for name in universe_names() {
        let symbols = match universe_symbols(name) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(1);
            }
        };
        println!("{}: {}", name, symbols.join(", "));
    }
    ExitCode::SUCCESS
}

fn data_port_from(
    config_path: Option<&PathBuf>,
    data_dir: Option<&PathBuf>,
) -> Result<CsvAdapter, ExitCode> {
    if let Some(dir) = data_dir {
        return Ok(CsvAdapter::new(dir.clone()));
    }

    let config_path = config_path.ok_or_else(|| {
        eprintln!("error: --data-dir or --config is required");
        ExitCode::from(1)
    })?;
    let config = load_config(config_path)?;

    resolve_data_dir(None, &config).map(CsvAdapter::new).map_err(|e| {
        eprintln!("error: {e}");
        (&e).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn resolve_symbols_override_wins() {
        let config = make_config("[backtest]\nsymbols = AAPL\n");
        let symbols = resolve_symbols(Some("msft,googl"), None, &config).unwrap();
        assert_eq!(symbols, vec!["MSFT", "GOOGL"]);
    }

    #[test]
    fn resolve_symbols_universe_override() {
        let config = make_config("[backtest]\nsymbols = AAPL\n");
        let symbols = resolve_symbols(None, Some("small"), &config).unwrap();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "GOOGL"]);
    }

    #[test]
    fn resolve_symbols_from_config() {
        let config = make_config("[backtest]\nsymbols = AAPL, MSFT\n");
        let symbols = resolve_symbols(None, None, &config).unwrap();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn resolve_symbols_config_universe_fallback() {
        let config = make_config("[backtest]\nuniverse = small\n");
        let symbols = resolve_symbols(None, None, &config).unwrap();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "GOOGL"]);
    }

    #[test]
    fn resolve_symbols_missing_everything() {
        let config = make_config("[backtest]\nweeks = 52\n");
        let err = resolve_symbols(None, None, &config).unwrap_err();
        assert!(matches!(err, DiptraderError::ConfigMissing { key, .. } if key == "symbols"));
    }

    #[test]
    fn build_configs_use_defaults() {
        let config = make_config("[backtest]\nsymbols = AAPL\n");
        let selector = build_selector_config(&config);
        assert_eq!(selector.min_volatility, 0.01);
        assert_eq!(selector.max_volatility, 0.5);
        assert_eq!(selector.min_data_points, 30);

        let trading = build_trading_config(&config);
        assert_eq!(trading.buy_threshold, -0.05);
        assert_eq!(trading.sell_threshold, 0.10);
        assert_eq!(trading.buy_amount, 5.0);
        assert_eq!(trading.sell_amount, 10.0);
    }

    #[test]
    fn build_configs_read_values() {
        let config = make_config(
            "[selector]\nmin_volatility = 0.02\nmax_volatility = 0.4\nmin_data_points = 20\n\
             [trading]\nbuy_threshold = -0.03\nsell_threshold = 0.08\nbuy_amount = 25\nsell_amount = 50\n",
        );
        let selector = build_selector_config(&config);
        assert_eq!(selector.min_volatility, 0.02);
        assert_eq!(selector.min_data_points, 20);

        let trading = build_trading_config(&config);
        assert_eq!(trading.buy_threshold, -0.03);
        assert_eq!(trading.sell_amount, 50.0);
    }

    #[test]
    fn resolve_dates_defaults_to_open_range() {
        let config = make_config("[backtest]\nsymbols = AAPL\n");
        let (start, end) = resolve_dates(&config).unwrap();
        assert_eq!(start, NaiveDate::MIN);
        assert_eq!(end, NaiveDate::MAX);
    }

    #[test]
    fn resolve_dates_rejects_inverted_range() {
        let config = make_config(
            "[backtest]\nstart_date = 2024-12-31\nend_date = 2024-01-01\n",
        );
        let err = resolve_dates(&config).unwrap_err();
        assert!(matches!(err, DiptraderError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn resolve_dates_rejects_bad_format() {
        let config = make_config("[backtest]\nstart_date = 01/01/2024\n");
        let err = resolve_dates(&config).unwrap_err();
        assert!(matches!(err, DiptraderError::ConfigInvalid { key, .. } if key == "start_date"));
    }
}
