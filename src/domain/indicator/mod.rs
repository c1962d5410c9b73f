//! Technical indicators used by the crossover strategy.

pub mod sma;
