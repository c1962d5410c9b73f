//! Domain error types.

/// Top-level error type for etfcross.
#[derive(Debug, thiserror::Error)]
pub enum EtfCrossError {
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

    #[error("invalid parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("no price data for {code}")]
    DataUnavailable { code: String },

    #[error("invalid price series: {reason}")]
    InvalidSeries { reason: String },

    #[error("data provider error: {reason}")]
    Provider { reason: String },

    #[error("instrument catalog error: {reason}")]
    Catalog { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EtfCrossError {
    pub fn invalid_parameters(reason: impl Into<String>) -> Self {
        EtfCrossError::InvalidParameters {
            reason: reason.into(),
        }
    }

    pub fn provider(reason: impl Into<String>) -> Self {
        EtfCrossError::Provider {
            reason: reason.into(),
        }
    }
}

impl From<&EtfCrossError> for std::process::ExitCode {
    fn from(err: &EtfCrossError) -> Self {
        let code: u8 = match err {
            EtfCrossError::Io(_) => 1,
            EtfCrossError::ConfigParse { .. }
            | EtfCrossError::ConfigMissing { .. }
            | EtfCrossError::ConfigInvalid { .. } => 2,
            EtfCrossError::Provider { .. } | EtfCrossError::Catalog { .. } => 3,
            EtfCrossError::InvalidParameters { .. } => 4,
            EtfCrossError::DataUnavailable { .. } | EtfCrossError::InvalidSeries { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
