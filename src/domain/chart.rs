//! Chart projection of an enriched series.
//!
//! Leading bars where either moving average is still warming up are dropped;
//! all arrays are parallel over the remaining bars.

use crate::domain::bar::format_trade_date;
use crate::domain::numeric::round2;
use crate::domain::signal::{EnrichedSeries, Signal};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OhlcArrays {
    pub open: Vec<f64>,
    pub close: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
}

/// Overlay points; `indices` address the trimmed arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalPoints {
    pub dates: Vec<String>,
    pub prices: Vec<f64>,
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSignals {
    pub buy: SignalPoints,
    pub sell: SignalPoints,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartBundle {
    pub dates: Vec<String>,
    pub prices: OhlcArrays,
    pub ma_short: Vec<f64>,
    pub ma_long: Vec<f64>,
    /// Empty unless every retained bar carries a volume.
    pub volume: Vec<f64>,
    pub signals: ChartSignals,
}

pub fn build_chart_bundle(series: &EnrichedSeries) -> ChartBundle {
    let retained = series.bars.get(series.params.warmup()..).unwrap_or(&[]);
    let mut chart = ChartBundle::default();

    for (index, eb) in retained.iter().enumerate() {
        let date = format_trade_date(eb.bar.date);
        let close = round2(eb.bar.close);

        chart.prices.open.push(round2(eb.bar.open));
        chart.prices.close.push(close);
        chart.prices.high.push(round2(eb.bar.high));
        chart.prices.low.push(round2(eb.bar.low));
        chart.ma_short.push(eb.short_ma.map(round2).unwrap_or(f64::NAN));
        chart.ma_long.push(eb.long_ma.map(round2).unwrap_or(f64::NAN));

        let points = match eb.signal {
            Signal::Buy => Some(&mut chart.signals.buy),
            Signal::Sell => Some(&mut chart.signals.sell),
            Signal::Hold => None,
        };
        if let Some(points) = points {
            points.dates.push(date.clone());
            points.prices.push(close);
            points.indices.push(index);
        }

        chart.dates.push(date);
    }

    let volumes: Option<Vec<f64>> = retained.iter().map(|eb| eb.bar.volume).collect();
    chart.volume = volumes.unwrap_or_default();

    chart
}
