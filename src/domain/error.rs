//! Domain error types.

/// Top-level error type for trendscan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
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

    #[error("invalid {field} value {value:?} at row {row}")]
    InvalidValue {
        field: String,
        value: String,
        row: usize,
    },

    #[error("series is not strictly increasing at index {index} ({timestamp})")]
    UnorderedSeries { index: usize, timestamp: String },

    #[error("no data for {symbol} {timeframe}")]
    NoData { symbol: String, timeframe: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        ScanError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&ScanError> for std::process::ExitCode {
    fn from(err: &ScanError) -> Self {
        let code: u8 = match err {
            ScanError::Io(_) => 1,
            ScanError::ConfigParse { .. }
            | ScanError::ConfigMissing { .. }
            | ScanError::ConfigInvalid { .. } => 2,
            ScanError::Data { .. }
            | ScanError::Csv(_)
            | ScanError::InvalidValue { .. }
            | ScanError::UnorderedSeries { .. } => 3,
            ScanError::NoData { .. } | ScanError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
