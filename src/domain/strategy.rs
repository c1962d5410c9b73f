//! Dual moving-average strategy pipeline.
//!
//! fetch → signals → backtest → chart → assembled response. A request either
//! yields all three sections or a failure message, never a partial payload.

use crate::domain::backtest::run_backtest;
use crate::domain::bar::PriceSeries;
use crate::domain::chart::build_chart_bundle;
use crate::domain::error::EtfCrossError;
use crate::domain::request::{StrategyRequest, ValidatedRequest};
use crate::domain::result::{SignalLabels, StrategyData, StrategyResponse, assemble};
use crate::domain::signal::{CrossoverParams, compute_signals};
use crate::ports::data_port::DataPort;
use std::sync::Arc;
use tracing::{info, warn};

/// Pure part of the pipeline, for a series already in hand.
pub fn run_strategy(
    series: &PriceSeries,
    params: CrossoverParams,
    labels: &SignalLabels,
) -> StrategyData {
    let enriched = compute_signals(series, params);
    let metrics = run_backtest(&enriched);
    let chart = build_chart_bundle(&enriched);
    assemble(&enriched, metrics, chart, labels)
}

/// Fetches, treating a provider error like an empty series.
pub fn fetch_or_empty(data_port: &dyn DataPort, request: &ValidatedRequest) -> PriceSeries {
    match data_port.fetch_price_series(&request.code, request.start_date, request.end_date) {
        Ok(series) => series,
        Err(e) => {
            warn!(code = %request.code, error = %e, "price fetch failed");
            PriceSeries::empty()
        }
    }
}

pub fn get_strategy_result(
    data_port: &dyn DataPort,
    request: &ValidatedRequest,
    labels: &SignalLabels,
) -> StrategyResponse {
    let series = fetch_or_empty(data_port, request);
    if series.is_empty() {
        let err = EtfCrossError::DataUnavailable {
            code: request.code.clone(),
        };
        return StrategyResponse::failure(err.to_string());
    }

    info!(
        code = %request.code,
        bars = series.len(),
        short = request.params.short_period(),
        long = request.params.long_period(),
        "running crossover backtest"
    );
    StrategyResponse::success(run_strategy(&series, request.params, labels))
}

/// Entry point shared by the CLI and the HTTP layer.
pub struct StrategyService {
    data_port: Arc<dyn DataPort + Send + Sync>,
    labels: SignalLabels,
}

impl StrategyService {
    pub fn new(data_port: Arc<dyn DataPort + Send + Sync>, labels: SignalLabels) -> Self {
        Self { data_port, labels }
    }

    /// Validates the request, then runs the pipeline. Only boundary
    /// validation is an `Err`; missing data is a failure response.
    pub fn get_strategy_result(
        &self,
        request: &StrategyRequest,
    ) -> Result<StrategyResponse, EtfCrossError> {
        let validated = request.validate()?;
        Ok(get_strategy_result(
            self.data_port.as_ref(),
            &validated,
            &self.labels,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Bar;
    use chrono::NaiveDate;

    struct FixedPort(Result<Vec<Bar>, String>);

    impl DataPort for FixedPort {
        fn fetch_price_series(
            &self,
            _code: &str,
            _start_date: NaiveDate,
            _end_date: NaiveDate,
        ) -> Result<PriceSeries, EtfCrossError> {
            match &self.0 {
                Ok(bars) => PriceSeries::new(bars.clone()),
                Err(reason) => Err(EtfCrossError::provider(reason.clone())),
            }
        }
    }

    fn request() -> ValidatedRequest {
        ValidatedRequest {
            code: "510300.SH".into(),
            start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
            params: CrossoverParams::new(2, 3).unwrap(),
        }
    }

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: Some(10.0),
            })
            .collect()
    }

    #[test]
    fn empty_series_is_failure() {
        let response = get_strategy_result(&FixedPort(Ok(vec![])), &request(), &SignalLabels::default());
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("no price data for 510300.SH"));
        assert!(response.data.is_none());
    }

    #[test]
    fn provider_error_is_failure() {
        let port = FixedPort(Err("timeout".into()));
        let response = get_strategy_result(&port, &request(), &SignalLabels::default());
        assert!(!response.success);
        assert!(response.data.is_none());
    }

    #[test]
    fn success_has_all_sections() {
        let port = FixedPort(Ok(bars(&[10.0, 10.0, 10.0, 11.0, 12.0, 13.0, 11.0, 9.0, 8.0])));
        let response = get_strategy_result(&port, &request(), &SignalLabels::default());
        assert!(response.success);
        let data = response.data.unwrap();
        assert_eq!(data.chart.dates.len(), 7);
        assert_eq!(data.signals.len(), 2);
        assert_eq!(data.backtest.trades, 1);
    }

    fn raw_request(short: i64, long: i64) -> StrategyRequest {
        StrategyRequest {
            code: " 510300.sh ".into(),
            start_date: "20220101".into(),
            end_date: "2022-12-31".into(),
            short_period: short,
            long_period: long,
        }
    }

    #[test]
    fn service_rejects_invalid_periods() {
        let service = StrategyService::new(Arc::new(FixedPort(Ok(vec![]))), SignalLabels::default());
        let err = service.get_strategy_result(&raw_request(20, 5)).unwrap_err();
        assert!(matches!(err, EtfCrossError::InvalidParameters { .. }));
    }

    #[test]
    fn service_runs_valid_request() {
        let port = FixedPort(Ok(bars(&[10.0, 10.0, 10.0, 11.0, 12.0, 13.0, 11.0, 9.0, 8.0])));
        let labels = SignalLabels::for_locale("en").unwrap();
        let service = StrategyService::new(Arc::new(port), labels);

        let response = service.get_strategy_result(&raw_request(2, 3)).unwrap();
        let data = response.data.unwrap();
        assert_eq!(data.signals[0].label, "BUY");
        assert_eq!(data.signals[1].label, "SELL");
    }
}
