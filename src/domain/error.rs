//! Domain error types.

use chrono::NaiveDate;

/// Failure raised by a strategy's entry/exit predicate or sizing function.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct RuleError {
    pub message: String,
}

impl RuleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Top-level error type for quantcore.
#[derive(Debug, thiserror::Error)]
pub enum QuantError {
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

    #[error("score {name} = {value} is outside [0, 1]")]
    InvalidScore { name: &'static str, value: f64 },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("invalid parameter range for {name}: {reason}")]
    InvalidParameterRange { name: String, reason: String },

    #[error("invalid parameters for strategy {strategy}: {reason}")]
    InvalidParameters { strategy: String, reason: String },

    #[error("strategy {strategy} failed on {date}: {source}")]
    StrategyRule {
        strategy: String,
        date: NaiveDate,
        #[source]
        source: RuleError,
    },

    #[error("strategy {strategy} produced invalid position size {size} on {date}")]
    InvalidPositionSize {
        strategy: String,
        date: NaiveDate,
        size: f64,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("data parse error in {file}: {reason}")]
    DataParse { file: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&QuantError> for std::process::ExitCode {
    fn from(err: &QuantError) -> Self {
        let code: u8 = match err {
            QuantError::Io(_) | QuantError::Json(_) => 1,
            QuantError::ConfigParse { .. }
            | QuantError::ConfigMissing { .. }
            | QuantError::ConfigInvalid { .. }
            | QuantError::InvalidParameterRange { .. } => 2,
            QuantError::NoData { .. } | QuantError::DataParse { .. } => 3,
            QuantError::UnknownStrategy { .. }
            | QuantError::InvalidParameters { .. }
            | QuantError::StrategyRule { .. }
            | QuantError::InvalidPositionSize { .. } => 4,
            QuantError::InvalidScore { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
