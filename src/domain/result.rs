//! Result assembly: metrics, trade events and chart bundle in one response.

use crate::domain::backtest::BacktestMetrics;
use crate::domain::bar::format_trade_date;
use crate::domain::chart::ChartBundle;
use crate::domain::numeric::round2;
use crate::domain::signal::{EnrichedSeries, Signal};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeKind {
    Buy,
    Sell,
}

/// Display text for buy and sell events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalLabels {
    pub buy: String,
    pub sell: String,
}

impl SignalLabels {
    pub const LOCALES: [&'static str; 2] = ["zh", "en"];

    pub fn for_locale(locale: &str) -> Option<Self> {
        let (buy, sell) = match locale.trim().to_lowercase().as_str() {
            "zh" | "zh-cn" | "zh_cn" => ("买入", "卖出"),
            "en" | "en-us" | "en_us" => ("BUY", "SELL"),
            _ => return None,
        };
        Some(Self {
            buy: buy.to_string(),
            sell: sell.to_string(),
        })
    }

    pub fn label(&self, kind: TradeKind) -> &str {
        match kind {
            TradeKind::Buy => &self.buy,
            TradeKind::Sell => &self.sell,
        }
    }
}

impl Default for SignalLabels {
    fn default() -> Self {
        Self {
            buy: "买入".to_string(),
            sell: "卖出".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeEvent {
    pub date: String,
    pub price: f64,
    pub kind: TradeKind,
    #[serde(rename = "type")]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyData {
    pub backtest: BacktestMetrics,
    pub signals: Vec<TradeEvent>,
    pub chart: ChartBundle,
}

/// Envelope returned to the serving layer. A failure carries only a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StrategyData>,
}

impl StrategyResponse {
    pub fn success(data: StrategyData) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

pub fn trade_events(series: &EnrichedSeries, labels: &SignalLabels) -> Vec<TradeEvent> {
    series
        .trade_bars()
        .filter_map(|eb| {
            let kind = match eb.signal {
                Signal::Buy => TradeKind::Buy,
                Signal::Sell => TradeKind::Sell,
                Signal::Hold => return None,
            };
            Some(TradeEvent {
                date: format_trade_date(eb.bar.date),
                price: round2(eb.bar.close),
                kind,
                label: labels.label(kind).to_string(),
            })
        })
        .collect()
}

pub fn assemble(
    series: &EnrichedSeries,
    backtest: BacktestMetrics,
    chart: ChartBundle,
    labels: &SignalLabels,
) -> StrategyData {
    StrategyData {
        backtest,
        signals: trade_events(series, labels),
        chart,
    }
}
