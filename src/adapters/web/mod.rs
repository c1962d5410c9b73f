//! HTTP adapter.
//!
//! JSON API under `/api` for the strategy page, with the static frontend
//! served for every other path.

mod error;
mod handlers;

pub use error::WebError;
pub use handlers::*;

use axum::{
    Router,
    routing::{any, get, post},
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};

use crate::domain::strategy::StrategyService;
use crate::ports::catalog_port::InstrumentCatalog;

pub struct AppState {
    pub service: Arc<StrategyService>,
    pub catalog: Arc<dyn InstrumentCatalog + Send + Sync>,
    pub static_dir: PathBuf,
}

pub fn build_router(state: AppState) -> Router {
    let index = state.static_dir.join("index.html");
    let frontend = ServeDir::new(&state.static_dir).fallback(ServeFile::new(index));

    Router::new()
        .route("/api/etf_codes", get(handlers::etf_codes))
        .route("/api/strategy", post(handlers::strategy))
        .route("/api/{*path}", any(handlers::api_not_found))
        .fallback_service(frontend)
        .with_state(Arc::new(state))
}
