//! Router-level tests: wiring, auth guard, and degraded-mode behavior.
//! No upstream traffic; everything here must resolve before a scrape starts.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use aula::config::Config;
use aula::state::AppState;
use aula::web::create_router;

fn test_router() -> axum::Router {
    let config: Config = serde_json::from_value(serde_json::json!({
        "educamos_base_url": "https://colegio.example.com",
    }))
    .expect("minimal config should deserialize");
    create_router(AppState::new(&config).expect("state should build without integrations"))
}

#[tokio::test]
async fn health_is_open() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn scrape_routes_require_a_session() {
    for uri in [
        "/api/classes",
        "/api/counters?studentId=p-1",
        "/api/context",
        "/api/announcements",
    ] {
        let response = test_router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn x_auth_token_is_accepted_as_a_session() {
    // With a token present the request passes the extractor and reaches the
    // gateway, which fails against the unreachable test host; anything but
    // 401 shows the guard accepted the header.
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/api/context")
                .header("x-auth-token", "ASP.NET_SessionId=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn push_routes_report_an_unconfigured_store() {
    let body = serde_json::json!({
        "userId": "edu_maria",
        "subscription": {
            "endpoint": "https://push.example.com/x",
            "keys": { "p256dh": "k", "auth": "a" }
        }
    });
    let response = test_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/push/subscribe")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
