//! Instrument list loaded from a `ts_code,name` CSV file.

use crate::domain::error::EtfCrossError;
use crate::ports::catalog_port::{Instrument, InstrumentCatalog};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct FundCodeRow {
    ts_code: String,
    name: String,
}

pub struct FundCodeCatalog {
    path: PathBuf,
}

impl FundCodeCatalog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl InstrumentCatalog for FundCodeCatalog {
    fn list_instruments(&self) -> Result<Vec<Instrument>, EtfCrossError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| EtfCrossError::Catalog {
                reason: format!("failed to open {}: {}", self.path.display(), e),
            })?;

        let mut instruments = Vec::new();
        for row in rdr.deserialize::<FundCodeRow>() {
            let row = row.map_err(|e| EtfCrossError::Catalog {
                reason: format!("invalid row in {}: {}", self.path.display(), e),
            })?;
            if row.ts_code.is_empty() {
                continue;
            }
            instruments.push(Instrument {
                ts_code: row.ts_code,
                name: row.name,
            });
        }

        debug!(count = instruments.len(), "loaded instrument catalog");
        Ok(instruments)
    }
}
