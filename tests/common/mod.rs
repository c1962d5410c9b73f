#![allow(dead_code)]

use chrono::NaiveDate;
use etfcross::domain::bar::{Bar, PriceSeries};
use etfcross::domain::error::EtfCrossError;
use etfcross::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_price_series(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, EtfCrossError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(EtfCrossError::provider(reason.clone()));
        }
        let bars = self
            .data
            .get(code)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        PriceSeries::new(bars)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// First bar date used by [`bars_from_closes`].
pub fn first_date() -> NaiveDate {
    date(2022, 1, 3)
}

pub fn make_bar(date: NaiveDate, close: f64) -> Bar {
    Bar {
        date,
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume: Some(1000.0),
    }
}

/// One bar per calendar day starting at [`first_date`].
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(first_date() + chrono::Duration::days(i as i64), close))
        .collect()
}

pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(bars_from_closes(closes)).unwrap()
}

/// `n` evenly spaced steps from `from` (exclusive) to `to` (inclusive).
pub fn ramp(from: f64, to: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|k| from + (to - from) * (k + 1) as f64 / n as f64)
        .collect()
}

/// Flat, rise, flat: a single golden cross with 5/20 averages and the price
/// higher at the end.
pub fn single_golden_cross_closes() -> Vec<f64> {
    let mut closes = vec![10.0; 30];
    closes.extend(ramp(10.0, 12.0, 20));
    closes.extend(vec![12.0; 10]);
    closes
}

/// 252 bars giving two 5/20 round trips: a rise that is sold higher, then a
/// short bounce that is sold lower.
pub fn two_round_trip_closes() -> Vec<f64> {
    let mut closes = vec![10.0; 40];
    closes.extend(ramp(10.0, 15.0, 20));
    closes.extend(vec![15.0; 40]);
    closes.extend(ramp(15.0, 12.0, 30));
    closes.extend(vec![12.0; 30]);
    closes.extend(ramp(12.0, 13.0, 4));
    closes.extend(ramp(13.0, 9.0, 10));
    closes.resize(252, 9.0);
    closes
}
