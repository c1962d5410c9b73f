//! Dual moving-average crossover signal engine.
//!
//! One forward pass over the price series builds an [`EnrichedBar`] per input
//! bar. The previous averages and the running position are carried as
//! accumulators; nothing already emitted is revisited.

use crate::domain::bar::{Bar, PriceSeries};
use crate::domain::error::EtfCrossError;
use crate::domain::indicator::sma::calculate_sma;
use serde::Serialize;

/// Validated short/long moving-average periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrossoverParams {
    short_period: usize,
    long_period: usize,
}

impl CrossoverParams {
    pub fn new(short_period: usize, long_period: usize) -> Result<Self, EtfCrossError> {
        if short_period == 0 {
            return Err(EtfCrossError::invalid_parameters(
                "short_period must be a positive integer",
            ));
        }
        if short_period >= long_period {
            return Err(EtfCrossError::invalid_parameters(
                "short_period must be less than long_period",
            ));
        }
        Ok(Self {
            short_period,
            long_period,
        })
    }

    pub fn short_period(&self) -> usize {
        self.short_period
    }

    pub fn long_period(&self) -> usize {
        self.long_period
    }

    /// Number of leading bars on which at least one average is undefined.
    pub fn warmup(&self) -> usize {
        self.short_period.max(self.long_period) - 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signal {
    Sell,
    Hold,
    Buy,
}

impl Signal {
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Sell => -1,
            Signal::Hold => 0,
            Signal::Buy => 1,
        }
    }

    pub fn is_trade(self) -> bool {
        self != Signal::Hold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Position {
    Flat,
    Long,
}

impl Position {
    /// Exposure multiplier applied to the next bar's return.
    pub fn exposure(self) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::Long => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedBar {
    pub bar: Bar,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
    pub signal: Signal,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedSeries {
    pub params: CrossoverParams,
    pub bars: Vec<EnrichedBar>,
}

impl EnrichedSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Bars carrying a buy or sell signal, in date order.
    pub fn trade_bars(&self) -> impl Iterator<Item = &EnrichedBar> {
        self.bars.iter().filter(|b| b.signal.is_trade())
    }
}

/// Raw crossing between two consecutive bars, before position gating.
fn detect_cross(prev: (Option<f64>, Option<f64>), curr: (Option<f64>, Option<f64>)) -> Signal {
    match (prev, curr) {
        ((Some(ps), Some(pl)), (Some(cs), Some(cl))) => {
            if ps <= pl && cs > cl {
                Signal::Buy
            } else if ps >= pl && cs < cl {
                Signal::Sell
            } else {
                Signal::Hold
            }
        }
        _ => Signal::Hold,
    }
}

pub fn compute_signals(series: &PriceSeries, params: CrossoverParams) -> EnrichedSeries {
    let bars = series.bars();
    let short = calculate_sma(bars, params.short_period);
    let long = calculate_sma(bars, params.long_period);

    let mut enriched = Vec::with_capacity(bars.len());
    let mut prev: (Option<f64>, Option<f64>) = (None, None);
    let mut position = Position::Flat;

    for (i, bar) in bars.iter().enumerate() {
        let curr = (short[i], long[i]);
        let cross = if i == 0 {
            Signal::Hold
        } else {
            detect_cross(prev, curr)
        };

        // A golden cross while long can only follow an exact touch of the
        // averages and is ignored. A death cross while flat is dropped: it is
        // either a leading downward crossing or follows a touch after a sell.
        let signal = match (cross, position) {
            (Signal::Buy, Position::Flat) => {
                position = Position::Long;
                Signal::Buy
            }
            (Signal::Sell, Position::Long) => {
                position = Position::Flat;
                Signal::Sell
            }
            _ => Signal::Hold,
        };

        enriched.push(EnrichedBar {
            bar: bar.clone(),
            short_ma: curr.0,
            long_ma: curr.1,
            signal,
            position,
        });
        prev = curr;
    }

    EnrichedSeries {
        params,
        bars: enriched,
    }
}
