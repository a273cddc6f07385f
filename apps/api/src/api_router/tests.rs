use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::ConnectInfo;
use axum::http::header::{CONTENT_TYPE, RETRY_AFTER};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use hookforge_application::{
    HookService, ProTierVerifier, RateLimitRule, SlidingWindowLimiter, SystemClock, TextGenerator,
    hash_token,
};
use hookforge_core::{AppError, AppResult};
use hookforge_domain::SamplingTemperature;
use hookforge_infrastructure::InMemoryRateRecordStore;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::build_router;
use crate::state::AppState;

const FRONTEND_URL: &str = "http://localhost:3000";

struct ScriptedTextGenerator {
    response: Result<&'static str, &'static str>,
}

#[async_trait]
impl TextGenerator for ScriptedTextGenerator {
    async fn generate(&self, _prompt: &str, _temperature: SamplingTemperature) -> AppResult<String> {
        self.response
            .map(ToOwned::to_owned)
            .map_err(|message| AppError::Upstream(message.to_owned()))
    }
}

fn test_router(response: Result<&'static str, &'static str>, trusted_proxies: &[&str]) -> Router {
    let rule = RateLimitRule::new(5, 60_000).unwrap_or_else(|_| unreachable!());
    let limiter = SlidingWindowLimiter::new(Arc::new(InMemoryRateRecordStore::new()), rule);
    let hook_service = HookService::new(
        limiter,
        Arc::new(ScriptedTextGenerator { response }),
        ProTierVerifier::new([hash_token("pro-secret")]),
        Arc::new(SystemClock),
    );

    let state = AppState {
        hook_service,
        redis_client: None,
        trusted_proxies: Arc::new(
            trusted_proxies
                .iter()
                .map(|network| network.parse().unwrap_or_else(|_| unreachable!()))
                .collect(),
        ),
    };

    build_router(state, FRONTEND_URL).unwrap_or_else(|_| unreachable!())
}

fn generate_request(peer: &str, body: &str) -> Request<Body> {
    generate_request_with(peer, body, None)
}

fn generate_request_with(peer: &str, body: &str, forwarded_for: Option<&str>) -> Request<Body> {
    let peer: SocketAddr = format!("{peer}:40000")
        .parse()
        .unwrap_or_else(|_| unreachable!());
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/generate")
        .header(CONTENT_TYPE, "application/json")
        .extension(ConnectInfo(peer));
    if let Some(forwarded_for) = forwarded_for {
        builder = builder.header("x-forwarded-for", forwarded_for);
    }
    builder
        .body(Body::from(body.to_owned()))
        .unwrap_or_else(|_| unreachable!())
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|_| unreachable!())
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    serde_json::from_slice(&bytes).unwrap_or_default()
}

#[tokio::test]
async fn generate_returns_parsed_hooks() {
    let router = test_router(Ok("Hook one\n\nHook two\n"), &[]);

    let response = send(&router, generate_request("203.0.113.1", r#"{"topic":"tea"}"#)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|value| value.to_str().ok()),
        Some("4")
    );
    assert_eq!(
        json_body(response).await,
        json!({"hooks": ["Hook one", "Hook two"]})
    );
}

#[tokio::test]
async fn pro_token_sets_flag() {
    let router = test_router(Ok("Hook"), &[]);

    let response = send(
        &router,
        generate_request("203.0.113.1", r#"{"topic":"tea","proToken":"pro-secret"}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["isPro"], json!(true));
}

#[tokio::test]
async fn missing_topic_is_bad_request() {
    let router = test_router(Ok("Hook"), &[]);

    for body in ["{}", r#"{"topic":"   "}"#] {
        let response = send(&router, generate_request("203.0.113.1", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = json_body(response).await;
        assert!(
            payload["error"]
                .as_str()
                .is_some_and(|message| message.starts_with("Missing topic"))
        );
    }
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let router = test_router(Ok("Hook"), &[]);

    let response = send(&router, generate_request("203.0.113.1", "{not json")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn other_methods_are_not_allowed() {
    let router = test_router(Ok("Hook"), &[]);

    let request = Request::builder()
        .method("GET")
        .uri("/api/generate")
        .body(Body::empty())
        .unwrap_or_else(|_| unreachable!());
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Method not allowed"})
    );
}

#[tokio::test]
async fn sixth_request_in_window_is_rate_limited() {
    let router = test_router(Ok("Hook"), &[]);

    for _ in 0..5 {
        let response = send(&router, generate_request("203.0.113.1", r#"{"topic":"tea"}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let limited = send(&router, generate_request("203.0.113.1", r#"{"topic":"tea"}"#)).await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after_header = limited
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok());
    assert!(retry_after_header.is_some_and(|seconds| (1..=60).contains(&seconds)));

    let payload = json_body(limited).await;
    assert!(payload["error"].is_string());
    assert!(payload["retryAfter"].as_i64().is_some_and(|reset| reset > 0));

    let other_client = send(&router, generate_request("203.0.113.2", r#"{"topic":"tea"}"#)).await;
    assert_eq!(other_client.status(), StatusCode::OK);
}

#[tokio::test]
async fn forwarded_header_is_ignored_from_untrusted_peer() {
    let router = test_router(Ok("Hook"), &[]);

    for index in 0..6 {
        let forwarded = format!("198.51.100.{index}");
        let response = send(
            &router,
            generate_request_with("203.0.113.1", r#"{"topic":"tea"}"#, Some(&forwarded)),
        )
        .await;
        let expected = if index < 5 {
            StatusCode::OK
        } else {
            StatusCode::TOO_MANY_REQUESTS
        };
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
async fn forwarded_header_is_honoured_from_trusted_proxy() {
    let router = test_router(Ok("Hook"), &["10.0.0.0/8"]);

    for index in 0..6 {
        let forwarded = format!("198.51.100.{index}");
        let response = send(
            &router,
            generate_request_with("10.0.0.5", r#"{"topic":"tea"}"#, Some(&forwarded)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn generation_failure_hides_upstream_detail() {
    let router = test_router(Err("quota exhausted for key abc123"), &[]);

    let response = send(&router, generate_request("203.0.113.1", r#"{"topic":"tea"}"#)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let payload = json_body(response).await;
    let message = payload["error"].as_str().unwrap_or_default();
    assert!(!message.is_empty());
    assert!(!message.contains("abc123"));
}

#[tokio::test]
async fn health_reports_in_memory_store() {
    let router = test_router(Ok("Hook"), &[]);

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap_or_else(|_| unreachable!());
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"status": "ok", "store": {"status": "memory"}})
    );
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let router = test_router(Ok("Hook"), &[]);

    let request = Request::builder()
        .uri("/api/unknown")
        .body(Body::empty())
        .unwrap_or_else(|_| unreachable!());
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
