//! Backtest engine: position timeline to performance metrics.
//!
//! The position held at the close of bar i-1 earns the return realized on
//! bar i, so a signal can never trade on the bar that produced it.

use crate::domain::numeric::to_percent;
use crate::domain::signal::EnrichedSeries;
use crate::domain::trades::pair_trades;
use chrono::NaiveDate;
use serde::Serialize;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Reported figures. Return, drawdown and win rate are percentages with two
/// decimals; `trades` counts round trips including one still open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BacktestMetrics {
    pub total_return: f64,
    pub annual_return: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub trades: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub daily_return: f64,
    pub strategy_return: f64,
    pub cumulative_return: f64,
    pub running_max: f64,
    pub drawdown: f64,
}

pub fn equity_curve(series: &EnrichedSeries) -> Vec<EquityPoint> {
    let mut points = Vec::with_capacity(series.len());
    let mut growth = 1.0_f64;
    let mut running_max = f64::NEG_INFINITY;

    for (i, eb) in series.bars.iter().enumerate() {
        let (daily_return, strategy_return) = if i == 0 {
            (0.0, 0.0)
        } else {
            let prev = &series.bars[i - 1];
            let daily = eb.bar.close / prev.bar.close - 1.0;
            let daily = if daily.is_finite() { daily } else { 0.0 };
            (daily, prev.position.exposure() * daily)
        };

        growth *= 1.0 + strategy_return;
        let cumulative_return = growth - 1.0;
        running_max = running_max.max(cumulative_return);

        points.push(EquityPoint {
            date: eb.bar.date,
            daily_return,
            strategy_return,
            cumulative_return,
            running_max,
            drawdown: running_max - cumulative_return,
        });
    }

    points
}

pub fn run_backtest(series: &EnrichedSeries) -> BacktestMetrics {
    if series.is_empty() {
        return BacktestMetrics::default();
    }

    let curve = equity_curve(series);
    let total_return = curve.last().map(|p| p.cumulative_return).unwrap_or(0.0);
    let max_drawdown = curve.iter().map(|p| p.drawdown).fold(0.0_f64, f64::max);

    let bars = curve.len() as f64;
    let annual_return = (1.0 + total_return).powf(TRADING_DAYS_PER_YEAR / bars) - 1.0;
    let annual_return = if annual_return.is_finite() {
        annual_return
    } else {
        0.0
    };

    let trips = pair_trades(series);
    let wins = trips.iter().filter(|t| t.is_win()).count();
    let win_rate = if trips.is_empty() {
        0.0
    } else {
        wins as f64 / trips.len() as f64
    };

    BacktestMetrics {
        total_return: to_percent(total_return),
        annual_return: to_percent(annual_return),
        max_drawdown: to_percent(max_drawdown),
        win_rate: to_percent(win_rate),
        trades: trips.len(),
    }
}
