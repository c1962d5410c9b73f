//! Strategy request parameters and boundary validation.
//!
//! Everything here runs before the engine: the engine itself assumes a
//! non-empty code, an ordered date range and valid periods.

use crate::domain::bar::parse_trade_date;
use crate::domain::error::EtfCrossError;
use crate::domain::signal::CrossoverParams;
use chrono::NaiveDate;
use serde_json::Value;

pub const REQUIRED_FIELDS: [&str; 5] = [
    "ts_code",
    "start_date",
    "end_date",
    "short_period",
    "long_period",
];

/// Raw request as received from a client.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRequest {
    pub code: String,
    pub start_date: String,
    pub end_date: String,
    pub short_period: i64,
    pub long_period: i64,
}

/// Request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub params: CrossoverParams,
}

impl StrategyRequest {
    /// Reads the JSON body of a strategy request. Periods may be given as
    /// integers or as numeric strings.
    pub fn from_json(body: &Value) -> Result<Self, EtfCrossError> {
        for field in REQUIRED_FIELDS {
            if body.get(field).is_none_or(Value::is_null) {
                return Err(EtfCrossError::invalid_parameters(format!(
                    "missing required field: {field}"
                )));
            }
        }

        Ok(Self {
            code: json_string(body, "ts_code")?,
            start_date: json_string(body, "start_date")?,
            end_date: json_string(body, "end_date")?,
            short_period: json_integer(body, "short_period")?,
            long_period: json_integer(body, "long_period")?,
        })
    }

    pub fn validate(&self) -> Result<ValidatedRequest, EtfCrossError> {
        let code = self.code.trim().to_uppercase();
        if code.is_empty() {
            return Err(EtfCrossError::invalid_parameters("ts_code must not be empty"));
        }
        if !is_valid_code(&code) {
            return Err(EtfCrossError::invalid_parameters(format!(
                "invalid ts_code '{code}', expected letters, digits, '.' or '_'"
            )));
        }

        let start_date = parse_request_date(&self.start_date, "start_date")?;
        let end_date = parse_request_date(&self.end_date, "end_date")?;
        if start_date > end_date {
            return Err(EtfCrossError::invalid_parameters(
                "start_date must not be after end_date",
            ));
        }

        let short = positive_period(self.short_period, "short_period")?;
        let long = positive_period(self.long_period, "long_period")?;
        let params = CrossoverParams::new(short, long)?;

        Ok(ValidatedRequest {
            code,
            start_date,
            end_date,
            params,
        })
    }
}

/// Codes name files and remote instruments, so only `[A-Z0-9._]` without a
/// `..` sequence is accepted.
fn is_valid_code(code: &str) -> bool {
    !code.contains("..")
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '_')
}

fn parse_request_date(value: &str, field: &str) -> Result<NaiveDate, EtfCrossError> {
    parse_trade_date(value).ok_or_else(|| {
        EtfCrossError::invalid_parameters(format!(
            "invalid {field} '{value}', expected YYYYMMDD or YYYY-MM-DD"
        ))
    })
}

fn positive_period(value: i64, field: &str) -> Result<usize, EtfCrossError> {
    if value <= 0 {
        return Err(EtfCrossError::invalid_parameters(format!(
            "{field} must be a positive integer"
        )));
    }
    usize::try_from(value)
        .map_err(|_| EtfCrossError::invalid_parameters(format!("{field} is out of range")))
}

fn json_string(body: &Value, field: &str) -> Result<String, EtfCrossError> {
    match &body[field] {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(EtfCrossError::invalid_parameters(format!(
            "{field} must be a string"
        ))),
    }
}

fn json_integer(body: &Value, field: &str) -> Result<i64, EtfCrossError> {
    let parsed = match &body[field] {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| EtfCrossError::invalid_parameters(format!("{field} must be an integer")))
}
