pub mod routes;
pub mod ws;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

/// HTTP + WS surface of the dashboard backend, with the built dashboard
/// served from `DASHBOARD_DIR` for every other path.
pub fn router(state: Arc<AppState>) -> Router {
    let dashboard = &state.config.dashboard_dir;
    let static_files =
        ServeDir::new(dashboard).fallback(ServeFile::new(dashboard.join("index.html")));

    Router::new()
        .route("/api/templates", get(routes::list_templates))
        .route("/api/templates/{id}", post(routes::instantiate_template))
        .route("/api/quote/{symbol}", get(routes::get_quote))
        .route("/api/volatility/{symbol}", get(routes::get_volatility))
        .route("/api/analyze", post(routes::post_analyze))
        .route("/api/greeks", post(routes::post_greeks))
        .route("/api/implied-vol", post(routes::post_implied_vol))
        .route("/api/counters", get(routes::get_counters))
        .route("/ws", get(ws::ws_handler))
        .fallback_service(static_files)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::new(AppConfig::default()))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn straddle_request() -> Value {
        json!({
            "name": "Long Straddle",
            "contracts": [
                { "type": "call", "strike": 100.0, "premium": 5.0, "quantity": 1, "position": "long", "expiration": "2024-12-31" },
                { "type": "put",  "strike": 100.0, "premium": 5.0, "quantity": 1, "position": "long", "expiration": "2024-12-31" }
            ],
            "underlyingPrice": 100.0,
            "riskFreeRate": 5.0,
            "volatility": 25.0,
            "daysToExpiration": 30
        })
    }

    #[tokio::test]
    async fn test_list_templates() {
        let (status, body) = send(app(), get_req("/api/templates")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 9);
        assert_eq!(body[0]["id"], "long-call");
    }

    #[tokio::test]
    async fn test_instantiate_template() {
        let (status, body) = send(
            app(),
            post_json("/api/templates/iron-condor?symbol=spy&expiration=2024-12-20", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let contracts = body["contracts"].as_array().unwrap();
        assert_eq!(contracts.len(), 4);
        assert!(contracts.iter().all(|c| c["underlying"] == "SPY" && c["expiration"] == "2024-12-20"));
    }

    #[tokio::test]
    async fn test_unknown_template_is_bad_request() {
        let (status, body) = send(app(), post_json("/api/templates/nope", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_analyze_straddle() {
        let (status, body) = send(app(), post_json("/api/analyze", straddle_request())).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["curve"].as_array().unwrap().len(), 101);
        assert_eq!(body["metrics"]["max_loss"], -1000.0);
        assert_eq!(body["metrics"]["breakevens"].as_array().unwrap().len(), 2);
        assert_eq!(body["recommended_size"], 1);
        assert_eq!(body["upside"], "unlimited_profit");
    }

    #[tokio::test]
    async fn test_analyze_rejects_zero_strike() {
        let mut req = straddle_request();
        req["contracts"][0]["strike"] = json!(0.0);
        let (status, body) = send(app(), post_json("/api/analyze", req)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("strike"));
    }

    #[tokio::test]
    async fn test_analyze_rejects_oversized_grid() {
        let mut req = straddle_request();
        req["range"] = json!({ "min": 70.0, "max": 130.0, "steps": u64::MAX });
        let (status, body) = send(app(), post_json("/api/analyze", req)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(body["error"].as_str().unwrap().contains("steps"));
    }

    #[tokio::test]
    async fn test_greeks_defaults_from_config() {
        let (status, body) = send(
            app(),
            post_json("/api/greeks", json!({ "type": "call", "strike": 100.0, "underlyingPrice": 100.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let delta = body["greeks"]["delta"].as_f64().unwrap();
        assert!(delta > 0.5 && delta < 0.6, "delta={delta}");
        assert_eq!(body["model"], "Black-Scholes");
    }

    #[tokio::test]
    async fn test_implied_vol_round_trip() {
        // ATM call, 30 days, 5%, priced at 25% vol.
        let market = crate::models::MarketParameters::from_dashboard(100.0, 5.0, 25.0, 30.0).unwrap();
        let price = crate::models::black_scholes::price(
            crate::models::OptionKind::Call,
            &market.params_for(100.0).unwrap(),
        );
        let (status, body) = send(
            app(),
            post_json(
                "/api/implied-vol",
                json!({
                    "type": "call",
                    "marketPrice": price,
                    "underlyingPrice": 100.0,
                    "strike": 100.0,
                    "riskFreeRate": 5.0,
                    "daysToExpiration": 30
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["status"], "converged");
        assert!((body["sigma"].as_f64().unwrap() - 0.25).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_mock_quote_and_unknown_symbol() {
        let (status, body) = send(app(), get_req("/api/quote/tsla")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "mock");
        assert_eq!(body["quote"]["price"], 185.25);

        let (status, _) = send(app(), get_req("/api/quote/ZZZZ")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_counters_track_rejections() {
        let state = AppState::new(AppConfig::default());
        let _ = send(router(state.clone()), post_json("/api/templates/nope", json!({}))).await;
        let (status, body) = send(router(state), get_req("/api/counters")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["requests_rejected"], 1);
    }
}
