//! Tushare Pro market-data adapter.
//!
//! Every Tushare endpoint answers with a table of named `fields` and row
//! `items`. Fund bars come from `fund_daily` and are forward-adjusted with the
//! `fund_adj` factors so the most recent bar keeps its traded price; an
//! instrument with no fund bars falls back to the stock `daily` endpoint.
//!
//! Table decoding and adjustment are plain functions. The HTTP client is
//! behind the `tushare` feature.

use crate::domain::bar::{Bar, parse_trade_date};
use crate::domain::error::EtfCrossError;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

pub const DEFAULT_BASE_URL: &str = "http://api.tushare.pro";

#[derive(Debug, Deserialize)]
pub struct TushareResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<TushareTable>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TushareTable {
    pub fields: Vec<String>,
    pub items: Vec<Vec<Value>>,
}

impl TushareResponse {
    pub fn into_table(self, api_name: &str) -> Result<TushareTable, EtfCrossError> {
        if self.code != 0 {
            return Err(EtfCrossError::provider(format!(
                "{api_name} returned code {}: {}",
                self.code,
                self.msg.unwrap_or_default()
            )));
        }
        Ok(self.data.unwrap_or_default())
    }
}

impl TushareTable {
    fn column(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    fn require(&self, name: &str) -> Result<usize, EtfCrossError> {
        self.column(name)
            .ok_or_else(|| EtfCrossError::provider(format!("response lacks {name} field")))
    }
}

fn cell_f64(row: &[Value], index: usize) -> Option<f64> {
    match row.get(index)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn cell_date(row: &[Value], index: usize) -> Option<NaiveDate> {
    match row.get(index)? {
        Value::String(s) => parse_trade_date(s),
        Value::Number(n) => parse_trade_date(&n.to_string()),
        _ => None,
    }
}

/// Rows lacking a date or any OHLC value are skipped.
pub fn bars_from_table(table: &TushareTable) -> Result<Vec<Bar>, EtfCrossError> {
    if table.items.is_empty() {
        return Ok(Vec::new());
    }

    let date = table.require("trade_date")?;
    let open = table.require("open")?;
    let high = table.require("high")?;
    let low = table.require("low")?;
    let close = table.require("close")?;
    let vol = table.column("vol");

    let bars = table
        .items
        .iter()
        .filter_map(|row| {
            Some(Bar {
                date: cell_date(row, date)?,
                open: cell_f64(row, open)?,
                high: cell_f64(row, high)?,
                low: cell_f64(row, low)?,
                close: cell_f64(row, close)?,
                volume: vol.and_then(|i| cell_f64(row, i)),
            })
        })
        .collect();
    Ok(bars)
}

pub fn adj_factors_from_table(
    table: &TushareTable,
) -> Result<HashMap<NaiveDate, f64>, EtfCrossError> {
    if table.items.is_empty() {
        return Ok(HashMap::new());
    }

    let date = table.require("trade_date")?;
    let factor = table.require("adj_factor")?;

    Ok(table
        .items
        .iter()
        .filter_map(|row| Some((cell_date(row, date)?, cell_f64(row, factor)?)))
        .collect())
}

/// Scales OHLC by `factor(date) / factor(latest date)`. A bar without its own
/// factor uses 1.0 as its factor. Volume is left untouched.
pub fn forward_adjust(bars: Vec<Bar>, factors: &HashMap<NaiveDate, f64>) -> Vec<Bar> {
    let latest = match factors.iter().max_by_key(|(date, _)| **date) {
        Some((_, &f)) if f > 0.0 => f,
        _ => return bars,
    };

    bars.into_iter()
        .map(|bar| {
            let ratio = factors.get(&bar.date).copied().unwrap_or(1.0) / latest;
            Bar {
                open: bar.open * ratio,
                high: bar.high * ratio,
                low: bar.low * ratio,
                close: bar.close * ratio,
                ..bar
            }
        })
        .collect()
}

#[cfg(feature = "tushare")]
pub use client::TushareAdapter;

#[cfg(feature = "tushare")]
mod client {
    use super::*;
    use crate::domain::bar::{PriceSeries, format_trade_date};
    use crate::ports::config_port::ConfigPort;
    use crate::ports::data_port::DataPort;
    use serde_json::json;
    use std::time::Duration;
    use tracing::{debug, info};

    pub struct TushareAdapter {
        client: reqwest::blocking::Client,
        token: String,
        base_url: String,
    }

    impl TushareAdapter {
        pub fn new(
            token: impl Into<String>,
            base_url: impl Into<String>,
            timeout: Duration,
        ) -> Result<Self, EtfCrossError> {
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| EtfCrossError::provider(format!("failed to build HTTP client: {e}")))?;
            Ok(Self {
                client,
                token: token.into(),
                base_url: base_url.into(),
            })
        }

        /// `token` is resolved by the caller (config file or process
        /// environment); this adapter never reads global state itself.
        pub fn from_config(config: &dyn ConfigPort, token: String) -> Result<Self, EtfCrossError> {
            let base_url = config
                .get_string("tushare", "base_url")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
            let timeout = config.get_double("tushare", "timeout_secs", 30.0);
            Self::new(token, base_url, Duration::from_secs_f64(timeout.max(1.0)))
        }

        fn query(&self, api_name: &str, params: Value) -> Result<TushareTable, EtfCrossError> {
            debug!(api_name, %params, "tushare request");
            let body = json!({
                "api_name": api_name,
                "token": self.token,
                "params": params,
                "fields": "",
            });
            let response: TushareResponse = self
                .client
                .post(&self.base_url)
                .json(&body)
                .send()
                .and_then(|r| r.error_for_status())
                .and_then(|r| r.json())
                .map_err(|e| EtfCrossError::provider(format!("{api_name} request failed: {e}")))?;
            response.into_table(api_name)
        }

        fn fund_bars(
            &self,
            code: &str,
            start: &str,
            end: &str,
        ) -> Result<Vec<Bar>, EtfCrossError> {
            let table = self.query(
                "fund_daily",
                json!({ "ts_code": code, "start_date": start, "end_date": end }),
            )?;
            let bars = bars_from_table(&table)?;
            if bars.is_empty() {
                return Ok(bars);
            }

            let adj = self.query("fund_adj", json!({ "ts_code": code }))?;
            let factors = adj_factors_from_table(&adj)?;
            Ok(forward_adjust(bars, &factors))
        }
    }

    impl DataPort for TushareAdapter {
        fn fetch_price_series(
            &self,
            code: &str,
            start_date: NaiveDate,
            end_date: NaiveDate,
        ) -> Result<PriceSeries, EtfCrossError> {
            let start = format_trade_date(start_date);
            let end = format_trade_date(end_date);

            let mut bars = self.fund_bars(code, &start, &end)?;
            if bars.is_empty() {
                info!(code, "no fund bars, trying stock daily");
                let table = self.query(
                    "daily",
                    json!({ "ts_code": code, "start_date": start, "end_date": end }),
                )?;
                bars = bars_from_table(&table)?;
            }

            Ok(PriceSeries::from_unsorted(bars))
        }
    }
}
