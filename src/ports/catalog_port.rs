//! Instrument catalog port.

use crate::domain::error::EtfCrossError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instrument {
    pub ts_code: String,
    pub name: String,
}

pub trait InstrumentCatalog {
    fn list_instruments(&self) -> Result<Vec<Instrument>, EtfCrossError>;
}
