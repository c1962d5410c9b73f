//! Price data access port.

use crate::domain::bar::PriceSeries;
use crate::domain::error::EtfCrossError;
use chrono::NaiveDate;

/// Source of daily bars, already adjusted for corporate actions.
///
/// An empty series means no data for the range; callers treat an `Err` the
/// same way after logging it.
pub trait DataPort {
    fn fetch_price_series(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, EtfCrossError>;
}
