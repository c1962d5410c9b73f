//! Simple Moving Average over closing prices.
//!
//! SMA(n)[i] = (P[i-n+1] + ... + P[i]) / n
//! Warmup: first (n-1) bars have no value.
//!
//! Every window is summed on its own rather than kept as a running sum, so two
//! windows holding the same prices produce bit-identical averages.

use crate::domain::bar::Bar;

pub fn calculate_sma(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; bars.len()];
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    (0..closes.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &closes[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}
