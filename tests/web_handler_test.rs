#![cfg(feature = "web")]
//! Web handler integration tests.
//!
//! Tests cover:
//! - Instrument list endpoint, including an unreadable catalog
//! - Strategy endpoint: success, no data, missing fields, invalid periods, path-like codes
//! - Unknown API paths and the static frontend fallback

mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use etfcross::adapters::fund_code_adapter::FundCodeCatalog;
use etfcross::adapters::web::{AppState, build_router};
use etfcross::domain::result::SignalLabels;
use etfcross::domain::strategy::StrategyService;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use common::*;

const CODE: &str = "510300.SH";

struct TestApp {
    _dir: TempDir,
    router: Router,
}

fn test_app(catalog_rows: Option<&str>) -> TestApp {
    let dir = TempDir::new().unwrap();
    let static_dir = dir.path().join("frontend");
    fs::create_dir(&static_dir).unwrap();
    fs::write(static_dir.join("index.html"), "<html>etfcross</html>").unwrap();
    fs::write(static_dir.join("app.js"), "console.log('ok');").unwrap();

    let catalog_path = dir.path().join("fund_code.csv");
    if let Some(rows) = catalog_rows {
        fs::write(&catalog_path, rows).unwrap();
    }

    let port = MockDataPort::new().with_bars(CODE, bars_from_closes(&two_round_trip_closes()));
    let state = AppState {
        service: Arc::new(StrategyService::new(Arc::new(port), SignalLabels::default())),
        catalog: Arc::new(FundCodeCatalog::new(catalog_path)),
        static_dir,
    };

    TestApp {
        _dir: dir,
        router: build_router(state),
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(router, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn strategy_body(code: &str) -> Value {
    json!({
        "ts_code": code,
        "start_date": "20220101",
        "end_date": "20221231",
        "short_period": 5,
        "long_period": "20"
    })
}

#[tokio::test]
async fn etf_codes_lists_catalog() {
    let app = test_app(Some("ts_code,name\n510300.SH,沪深300ETF\n159915.SZ,创业板ETF\n"));
    let (status, body) = get(app.router, "/api/etf_codes").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"][0], json!({ "ts_code": "510300.SH", "name": "沪深300ETF" }));
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn etf_codes_missing_catalog_is_not_found() {
    let app = test_app(None);
    let (status, body) = get(app.router, "/api/etf_codes").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn etf_codes_empty_catalog_is_not_found() {
    let app = test_app(Some("ts_code,name\n"));
    let (status, _) = get(app.router, "/api/etf_codes").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn strategy_returns_full_response() {
    let app = test_app(None);
    let (status, json) = post_json(app.router, "/api/strategy", strategy_body(CODE)).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["success"], true);
    let data = &json["data"];
    assert_eq!(data["backtest"]["trades"], 2);
    assert_eq!(data["backtest"]["win_rate"], 50.0);
    assert_eq!(data["signals"].as_array().unwrap().len(), 4);
    assert_eq!(data["signals"][0]["type"], "买入");
    assert_eq!(data["signals"][1]["type"], "卖出");
    assert_eq!(data["chart"]["signals"]["buy"]["dates"].as_array().unwrap().len(), 2);
    assert_eq!(
        data["chart"]["dates"].as_array().unwrap().len(),
        data["chart"]["ma_long"].as_array().unwrap().len()
    );
}

#[tokio::test]
async fn strategy_without_data_is_unsuccessful() {
    let app = test_app(None);
    let (status, json) = post_json(app.router, "/api/strategy", strategy_body("000001.SZ")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({ "success": false, "message": "no price data for 000001.SZ" })
    );
}

#[tokio::test]
async fn strategy_missing_field_is_bad_request() {
    let app = test_app(None);
    let (status, json) = post_json(
        app.router,
        "/api/strategy",
        json!({ "ts_code": CODE, "start_date": "20220101", "end_date": "20221231", "short_period": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("long_period"));
}

#[tokio::test]
async fn strategy_invalid_periods_is_bad_request() {
    let app = test_app(None);
    let mut body = strategy_body(CODE);
    body["short_period"] = json!(30);
    let (status, json) = post_json(app.router, "/api/strategy", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn strategy_path_like_code_is_bad_request() {
    let app = test_app(None);
    let (status, json) = post_json(app.router, "/api/strategy", strategy_body("../secret")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("ts_code"));
}

#[tokio::test]
async fn strategy_malformed_json_is_bad_request() {
    let app = test_app(None);
    let request = Request::post("/api/strategy")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn unknown_api_path_is_json_not_found() {
    let app = test_app(None);
    let (status, body) = get(app.router, "/api/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn static_files_are_served() {
    let app = test_app(None);
    let (status, body) = get(app.router, "/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"console.log('ok');");
}

#[tokio::test]
async fn unknown_page_falls_back_to_index() {
    let app = test_app(None);
    let (status, body) = get(app.router, "/strategy/510300").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<html>etfcross</html>");
}
