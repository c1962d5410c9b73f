//! Configuration validation.
//!
//! Checks every value a command reads from the config file before the
//! command starts, so a bad file fails fast with the offending key.

use crate::domain::error::EtfCrossError;
use crate::domain::result::SignalLabels;
use crate::domain::signal::CrossoverParams;
use crate::ports::config_port::ConfigPort;
use std::net::SocketAddr;

pub const DATA_SOURCES: [&str; 2] = ["csv", "tushare"];
pub const DEFAULT_DATA_SOURCE: &str = "csv";
pub const DEFAULT_SHORT_PERIOD: i64 = 5;
pub const DEFAULT_LONG_PERIOD: i64 = 20;
pub const DEFAULT_LOCALE: &str = "zh";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:5000";

pub fn validate_app_config(config: &dyn ConfigPort) -> Result<(), EtfCrossError> {
    validate_data_source(config)?;
    default_params(config)?;
    signal_labels(config)?;
    listen_addr(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> EtfCrossError {
    EtfCrossError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

pub fn data_source(config: &dyn ConfigPort) -> String {
    config
        .get_string("data", "source")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| DEFAULT_DATA_SOURCE.to_string())
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), EtfCrossError> {
    let source = data_source(config);
    if !DATA_SOURCES.contains(&source.as_str()) {
        return Err(invalid(
            "data",
            "source",
            format!("unknown source '{source}', expected one of {DATA_SOURCES:?}"),
        ));
    }
    Ok(())
}

/// Default crossover periods from `[strategy]`, used when a command does not
/// override them.
pub fn default_params(config: &dyn ConfigPort) -> Result<CrossoverParams, EtfCrossError> {
    let short = config.get_int("strategy", "short_period", DEFAULT_SHORT_PERIOD);
    let long = config.get_int("strategy", "long_period", DEFAULT_LONG_PERIOD);

    let to_period = |value: i64, key: &str| {
        usize::try_from(value)
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| invalid("strategy", key, format!("{key} must be a positive integer")))
    };
    let short = to_period(short, "short_period")?;
    let long = to_period(long, "long_period")?;

    CrossoverParams::new(short, long).map_err(|e| match e {
        EtfCrossError::InvalidParameters { reason } => invalid("strategy", "short_period", reason),
        other => other,
    })
}

pub fn signal_labels(config: &dyn ConfigPort) -> Result<SignalLabels, EtfCrossError> {
    let locale = config
        .get_string("display", "locale")
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string());
    SignalLabels::for_locale(&locale).ok_or_else(|| {
        invalid(
            "display",
            "locale",
            format!(
                "unsupported locale '{locale}', expected one of {:?}",
                SignalLabels::LOCALES
            ),
        )
    })
}

pub fn listen_addr(config: &dyn ConfigPort) -> Result<SocketAddr, EtfCrossError> {
    let listen = config
        .get_string("web", "listen")
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    listen
        .parse()
        .map_err(|e| invalid("web", "listen", format!("'{listen}' is not a socket address: {e}")))
}
