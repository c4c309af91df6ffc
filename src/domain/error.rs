//! Domain error types.
//!
//! Only two conditions are fatal to a backtest run: not enough distinct
//! dates to simulate, and a run that never advanced past its initial
//! snapshot. Per-trade constraint violations (unaffordable buy, over-sized
//! sell, missing price) are normal control flow and never surface here.

/// Top-level error type for diptrader.
#[derive(Debug, thiserror::Error)]
pub enum DiptraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("insufficient data: {dates} distinct dates, need at least {minimum}")]
    InsufficientData { dates: usize, minimum: usize },

    #[error("backtest made no progress beyond the initial snapshot")]
    EmptyHistory,

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&DiptraderError> for std::process::ExitCode {
    fn from(err: &DiptraderError) -> Self {
        let code: u8 = match err {
            DiptraderError::Io(_) | DiptraderError::Report { .. } => 1,
            DiptraderError::ConfigParse { .. }
            | DiptraderError::ConfigMissing { .. }
            | DiptraderError::ConfigInvalid { .. } => 2,
            DiptraderError::Data { .. } => 3,
            DiptraderError::InsufficientData { .. } | DiptraderError::EmptyHistory => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = DiptraderError::InsufficientData {
            dates: 5,
            minimum: 14,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data: 5 distinct dates, need at least 14"
        );
    }

    #[test]
    fn config_missing_message() {
        let err = DiptraderError::ConfigMissing {
            section: "backtest".into(),
            key: "symbols".into(),
        };
        assert_eq!(err.to_string(), "missing config key [backtest] symbols");
    }

    #[test]
    fn exit_code_mapping() {
        let err = DiptraderError::EmptyHistory;
        let code: std::process::ExitCode = (&err).into();
        // ExitCode has no accessor; this only checks the conversion compiles
        // and is reachable for the fatal variants.
        let _ = code;
    }
}
