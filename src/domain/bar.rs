//! Daily bar and price series representation.

use crate::domain::error::EtfCrossError;
use chrono::NaiveDate;

/// Compact trade-date format used by the data provider and in all output.
pub const TRADE_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// `None` when the source carries no volume column.
    pub volume: Option<f64>,
}

/// Parses `YYYYMMDD` or `YYYY-MM-DD`.
pub fn parse_trade_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, TRADE_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

pub fn format_trade_date(date: NaiveDate) -> String {
    date.format(TRADE_DATE_FORMAT).to_string()
}

/// Bars in strictly increasing date order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, EtfCrossError> {
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(EtfCrossError::InvalidSeries {
                reason: format!(
                    "dates not strictly increasing: {} followed by {}",
                    pair[0].date, pair[1].date
                ),
            });
        }
        Ok(Self { bars })
    }

    /// Sorts by date and keeps the last bar seen for any repeated date.
    pub fn from_unsorted(mut bars: Vec<Bar>) -> Self {
        bars.reverse();
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self { bars }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}
