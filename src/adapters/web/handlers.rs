//! HTTP request handlers for web adapter.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::Uri,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::request::StrategyRequest;
use crate::domain::result::StrategyResponse;

use super::{AppState, WebError};

pub async fn etf_codes(State(state): State<Arc<AppState>>) -> Result<Json<Value>, WebError> {
    let catalog = Arc::clone(&state.catalog);
    let instruments = tokio::task::spawn_blocking(move || catalog.list_instruments())
        .await
        .map_err(|e| WebError::internal(format!("catalog task failed: {e}")))?;

    match instruments {
        Ok(list) if !list.is_empty() => Ok(Json(json!({ "success": true, "data": list }))),
        Ok(_) => Err(WebError::not_found("no instruments available")),
        Err(e) => {
            warn!(error = %e, "instrument catalog unavailable");
            Err(e.into())
        }
    }
}

pub async fn strategy(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StrategyResponse>, WebError> {
    let Json(body) = payload?;
    let request = StrategyRequest::from_json(&body)?;
    debug!(code = %request.code, "strategy request");

    let service = Arc::clone(&state.service);
    let response = tokio::task::spawn_blocking(move || service.get_strategy_result(&request))
        .await
        .map_err(|e| WebError::internal(format!("strategy task failed: {e}")))??;

    Ok(Json(response))
}

pub async fn api_not_found(uri: Uri) -> WebError {
    WebError::not_found(format!("no API route for {}", uri.path()))
}
