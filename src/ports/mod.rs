//! Port traits the core depends on; adapters implement them.

pub mod catalog_port;
pub mod config_port;
pub mod data_port;
