//! CSV file price store.
//!
//! One file per instrument, `<base>/<CODE>.csv`, with a header row naming
//! `trade_date,open,high,low,close` and optionally `vol`. Extra columns are
//! ignored and rows may appear in any order.

use crate::domain::bar::{Bar, PriceSeries, parse_trade_date};
use crate::domain::error::EtfCrossError;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, EtfCrossError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        let require = |names: &[&str]| {
            find(names).ok_or_else(|| EtfCrossError::provider(format!("missing {} column", names[0])))
        };

        Ok(Self {
            date: require(&["trade_date", "date"])?,
            open: require(&["open"])?,
            high: require(&["high"])?,
            low: require(&["low"])?,
            close: require(&["close"])?,
            volume: find(&["vol", "volume"]),
        })
    }
}

fn parse_price(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, EtfCrossError> {
    record
        .get(index)
        .ok_or_else(|| EtfCrossError::provider(format!("missing {name} value")))?
        .trim()
        .parse()
        .map_err(|e| EtfCrossError::provider(format!("invalid {name} value: {e}")))
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{code}.csv"))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_price_series(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, EtfCrossError> {
        let path = self.csv_path(code);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no price file");
                return Ok(PriceSeries::empty());
            }
            Err(e) => {
                return Err(EtfCrossError::provider(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| EtfCrossError::provider(format!("CSV header error: {e}")))?
            .clone();
        let columns = Columns::from_headers(&headers)?;
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record =
                result.map_err(|e| EtfCrossError::provider(format!("CSV parse error: {e}")))?;

            let date_str = record.get(columns.date).unwrap_or_default();
            let date = parse_trade_date(date_str).ok_or_else(|| {
                EtfCrossError::provider(format!("invalid date '{date_str}' in {}", path.display()))
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let volume = match columns.volume {
                Some(i) if !record.get(i).unwrap_or_default().trim().is_empty() => {
                    Some(parse_price(&record, i, "vol")?)
                }
                _ => None,
            };

            bars.push(Bar {
                date,
                open: parse_price(&record, columns.open, "open")?,
                high: parse_price(&record, columns.high, "high")?,
                low: parse_price(&record, columns.low, "low")?,
                close: parse_price(&record, columns.close, "close")?,
                volume,
            });
        }

        debug!(code, bars = bars.len(), "loaded price file");
        Ok(PriceSeries::from_unsorted(bars))
    }
}
