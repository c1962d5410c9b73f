//! Round-trip trade pairing.
//!
//! Signal events drive a two-state machine (FLAT, LONG). A buy while flat
//! opens a round trip, a sell while long closes it. Reaching the end of the
//! series while long yields an open round trip marked to the last close.

use crate::domain::signal::{EnrichedSeries, Signal};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Exit {
    Closed { date: NaiveDate, price: f64 },
    /// Still held at the evaluation horizon; valued at the final close.
    Open { mark_price: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTrip {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit: Exit,
}

impl RoundTrip {
    pub fn exit_price(&self) -> f64 {
        match self.exit {
            Exit::Closed { price, .. } => price,
            Exit::Open { mark_price } => mark_price,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.exit, Exit::Open { .. })
    }

    /// Strictly higher exit than entry; a flat trade is not a win.
    pub fn is_win(&self) -> bool {
        self.exit_price() > self.entry_price
    }
}

#[derive(Debug, Clone, Copy)]
enum LedgerState {
    Flat,
    Long { entry_date: NaiveDate, entry_price: f64 },
}

pub fn pair_trades(series: &EnrichedSeries) -> Vec<RoundTrip> {
    let mut trips = Vec::new();
    let mut state = LedgerState::Flat;

    for eb in series.trade_bars() {
        state = match (state, eb.signal) {
            (LedgerState::Flat, Signal::Buy) => LedgerState::Long {
                entry_date: eb.bar.date,
                entry_price: eb.bar.close,
            },
            (
                LedgerState::Long {
                    entry_date,
                    entry_price,
                },
                Signal::Sell,
            ) => {
                trips.push(RoundTrip {
                    entry_date,
                    entry_price,
                    exit: Exit::Closed {
                        date: eb.bar.date,
                        price: eb.bar.close,
                    },
                });
                LedgerState::Flat
            }
            (unchanged, _) => unchanged,
        };
    }

    if let (
        LedgerState::Long {
            entry_date,
            entry_price,
        },
        Some(last),
    ) = (state, series.bars.last())
    {
        trips.push(RoundTrip {
            entry_date,
            entry_price,
            exit: Exit::Open {
                mark_price: last.bar.close,
            },
        });
    }

    trips
}
