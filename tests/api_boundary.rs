//! Request-boundary tests driven through the router with tower's oneshot.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use mintscore::api::{create_router, AppState};
use mintscore::config::AppConfig;
use mintscore::model::Scorer;

fn app(dir: &std::path::Path) -> Router {
    let mut config = AppConfig::default();
    config.model.dir = dir.to_string_lossy().into_owned();
    create_router(AppState::new(Arc::new(Scorer::new(&config))))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn trade_json(mint: &str, trader: &str, ts: i64, mcap: f64, holders: u64) -> Value {
    json!({
        "mint": mint,
        "traderPublicKey": trader,
        "txType": "buy",
        "tokenAmount": 1000.0,
        "vSolInBondingCurve": 30.0 + ts as f64 / 10_000.0,
        "vTokensInBondingCurve": 1_000_000.0,
        "timestamp": ts,
        "marketCapSol": mcap,
        "holdersCount": holders
    })
}

fn token_json(mint: &str, final_mcap: Option<f64>) -> Value {
    let mut token = json!({
        "mint": mint,
        "initialBuySol": 1.5,
        "initialBuyPercent": 2.5,
        "liquidity": 32.0
    });
    if let Some(mcap) = final_mcap {
        token["marketCap"] = json!(mcap);
    }
    token
}

fn mint_trades(mint: &str, success: bool) -> Vec<Value> {
    (0..6)
        .map(|i| {
            let mcap = if success {
                100.0 + 60.0 * i as f64
            } else {
                100.0 + i as f64
            };
            trade_json(mint, &format!("{mint}_t{i}"), i * 8_000, mcap, 10 + i as u64)
        })
        .collect()
}

#[tokio::test]
async fn empty_training_batch_is_a_client_error() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(dir.path())
        .oneshot(post("/api/train", json!({"trades": [], "tokens": []})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("empty dataset"));
}

#[tokio::test]
async fn disjoint_mints_surface_the_failure_message() {
    let dir = tempfile::tempdir().unwrap();
    let request = json!({
        "trades": mint_trades("mintA", true),
        "tokens": [token_json("mintB", Some(500.0))],
    });
    let response = app(dir.path())
        .oneshot(post("/api/train", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("no overlapping mints"));
}

#[tokio::test]
async fn train_then_predict_through_the_router() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let mut trades = Vec::new();
    let mut tokens = Vec::new();
    for i in 0..3 {
        let mint = format!("good{i}");
        trades.extend(mint_trades(&mint, true));
        tokens.push(token_json(&mint, Some(500.0)));
    }
    for i in 0..3 {
        let mint = format!("flat{i}");
        trades.extend(mint_trades(&mint, false));
        tokens.push(token_json(&mint, Some(100.0)));
    }

    let response = app
        .clone()
        .oneshot(post(
            "/api/train",
            json!({"trades": trades, "tokens": tokens}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["report"]["examples"], 6);
    assert_eq!(body["report"]["positives"], 3);

    let response = app
        .clone()
        .oneshot(post(
            "/api/predict",
            json!({
                "trades": mint_trades("candidate", true),
                "token": token_json("candidate", None),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["isPromising"].is_boolean());
    let probability = body["probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&probability));
    assert!(body["analysis"]["early_signs"]["buy_pressure"].is_number());

    let response = app
        .oneshot(Request::builder().uri("/api/model").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["trained"], true);
    assert_eq!(body["featureCount"], 31);
}

#[tokio::test]
async fn predict_with_empty_trades_uses_the_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(dir.path())
        .oneshot(post(
            "/api/predict",
            json!({"trades": [], "token": token_json("live", None)}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["isPromising"], false);
    assert_eq!(body["probability"], 0.0);
}

#[tokio::test]
async fn untrained_model_status_reports_not_trained() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(dir.path())
        .oneshot(Request::builder().uri("/api/model").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["trained"], false);
}
