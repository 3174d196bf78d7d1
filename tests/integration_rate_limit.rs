mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use quizzler::router::init_router;
use quizzler_config::RateLimitConfig;
use serde_json::json;
use tower::ServiceExt;

use common::{body_json, get_request, setup_test_app};

fn limits(auth_max_requests: u32, general_max_requests: u32) -> RateLimitConfig {
    RateLimitConfig {
        window: Duration::from_secs(60),
        auth_max_requests,
        general_max_requests,
    }
}

fn login_from(ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(
            json!({ "email": "ada@example.com", "password": "correct-horse" }).to_string(),
        ))
        .unwrap()
}

fn header(response: &axum::response::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .map(|value| value.to_str().unwrap().to_string())
}

#[tokio::test]
async fn test_login_limit_counts_down_then_rejects() {
    let test = setup_test_app(limits(5, 100));
    let app = init_router(test.state);

    for expected_remaining in ["4", "3", "2", "1", "0"] {
        let response = app.clone().oneshot(login_from("203.0.113.9")).await.unwrap();

        // Unknown credentials, but the request was admitted.
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(header(&response, "x-ratelimit-limit").as_deref(), Some("5"));
        assert_eq!(
            header(&response, "x-ratelimit-remaining").as_deref(),
            Some(expected_remaining)
        );
        assert_eq!(header(&response, "retry-after"), None);
    }

    let response = app.oneshot(login_from("203.0.113.9")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&response, "retry-after").as_deref(), Some("60"));
    assert_eq!(header(&response, "x-ratelimit-remaining").as_deref(), Some("0"));
    assert_eq!(
        body_json(response).await["error"],
        "Too many requests. Please try again later."
    );
}

#[tokio::test]
async fn test_clients_have_separate_budgets() {
    let test = setup_test_app(limits(1, 100));
    let app = init_router(test.state);

    let first = app.clone().oneshot(login_from("203.0.113.9")).await.unwrap();
    assert_ne!(first.status(), StatusCode::TOO_MANY_REQUESTS);

    let again = app.clone().oneshot(login_from("203.0.113.9")).await.unwrap();
    assert_eq!(again.status(), StatusCode::TOO_MANY_REQUESTS);

    let other = app.oneshot(login_from("198.51.100.4")).await.unwrap();
    assert_ne!(other.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_routes_have_separate_budgets() {
    let test = setup_test_app(limits(1, 100));
    let app = init_router(test.state);

    let login = app.clone().oneshot(login_from("203.0.113.9")).await.unwrap();
    assert_ne!(login.status(), StatusCode::TOO_MANY_REQUESTS);

    let register = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "203.0.113.9")
        .body(Body::from(
            json!({ "email": "ada@example.com", "password": "correct-horse" }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(register).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_store_outage_admits_everything() {
    let test = setup_test_app(limits(1, 100));
    test.store.set_available(false);
    let app = init_router(test.state);

    for _ in 0..5 {
        let response = app.clone().oneshot(login_from("203.0.113.9")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(header(&response, "x-ratelimit-remaining").as_deref(), Some("1"));
    }
}

#[tokio::test(start_paused = true)]
async fn test_window_expiry_admits_again() {
    let test = setup_test_app(limits(2, 100));
    let app = init_router(test.state);

    for _ in 0..2 {
        let response = app.clone().oneshot(login_from("203.0.113.9")).await.unwrap();
        assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
    let denied = app.clone().oneshot(login_from("203.0.113.9")).await.unwrap();
    assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);

    tokio::time::advance(Duration::from_secs(60)).await;

    let response = app.oneshot(login_from("203.0.113.9")).await.unwrap();
    assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&response, "x-ratelimit-remaining").as_deref(), Some("1"));
}

#[tokio::test]
async fn test_protected_route_counts_before_authentication() {
    let test = setup_test_app(limits(100, 2));
    let app = init_router(test.state);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(get_request("/api/auth/me", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(header(&response, "x-ratelimit-limit").as_deref(), Some("2"));
    }

    let response = app
        .oneshot(get_request("/api/auth/me", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_health_is_not_rate_limited() {
    let test = setup_test_app(limits(1, 1));
    let app = init_router(test.state);

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(get_request("/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "x-ratelimit-limit"), None);
    }
}
