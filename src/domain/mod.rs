//! Core domain types and logic.

pub mod bar;
pub mod indicator;
pub mod signal;
pub mod trades;
pub mod backtest;
pub mod chart;
pub mod result;
pub mod request;
pub mod strategy;
pub mod numeric;
pub mod config_validation;
pub mod error;
