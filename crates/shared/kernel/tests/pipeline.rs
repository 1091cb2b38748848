use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::routing::get;
use jsonwebtoken::{EncodingKey, Header, encode};
use scaffold_kernel::domain::config::ApiConfig;
use scaffold_kernel::prelude::*;
use scaffold_kernel::server::pipeline;
use scaffold_kernel::server::problem::{PROBLEM_JSON, StatusCodeSelector};
use scaffold_kernel::server::router::system_router;
use serde_json::Value;
use tower::ServiceExt;

async fn fails_validation() -> Result<&'static str, ApiError> {
    Err(ApiError::invalid_operation("Order already shipped"))
}

async fn fails_io() -> Result<&'static str, ApiError> {
    let failure: Result<&'static str, std::io::Error> =
        Err(std::io::Error::other("disk unavailable"));
    Ok(failure?)
}

async fn panics() -> &'static str {
    panic!("handler exploded")
}

async fn whoami(axum::Extension(principal): axum::Extension<Principal>) -> String {
    principal.subject.unwrap_or_default()
}

fn app() -> Router {
    let state = ApiState::builder().config(ApiConfig::default()).build().expect("state");

    let protected = utoipa_axum::routes!(protected_handler);
    let (router, _) = RouteTable::new(&state)
        .merge(system_router())
        .protected_routes(protected)
        .route("/invalid", get(fails_validation))
        .route("/io", get(fails_io))
        .route("/panic", get(panics))
        .route("/whoami", get(whoami).route_layer(axum::middleware::from_fn_with_state(
            state.tokens.clone(),
            scaffold_kernel::server::auth::require_authorization,
        )))
        .into_parts();

    let (router, _) = router.split_for_parts();
    pipeline::apply(router.with_state(state), StatusCodeSelector::default())
}

#[utoipa::path(get, path = "/secure", responses((status = OK, body = String)))]
async fn protected_handler() -> &'static str {
    "secure"
}

fn bearer() -> String {
    let claims = serde_json::json!({ "sub": "integration", "exp": 4_102_444_800_u64 });
    let key = EncodingKey::from_secret(ApiConfig::default().identity.jwt.secret.as_bytes());
    let token = encode(&Header::default(), &claims, &key).expect("token");
    format!("Bearer {token}")
}

async fn send(request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app().oneshot(request).await.expect("infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, headers, body.to_vec())
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn invalid_operation_maps_to_bad_request_problem() {
    let (status, headers, body) = send(get_request("/invalid")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()), Some(PROBLEM_JSON));

    let problem: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(problem["type"], "InvalidOperation");
    assert_eq!(problem["title"], "An error occurred");
    assert_eq!(problem["status"], 400);
    assert_eq!(problem["detail"], "Order already shipped");
    assert_eq!(problem["instance"], "GET /invalid");

    let request_id =
        headers.get("x-request-id").and_then(|v| v.to_str().ok()).expect("request id header");
    assert_eq!(problem["requestId"], request_id);
}

#[tokio::test]
async fn other_errors_map_to_internal_server_error() {
    let (status, _, body) = send(get_request("/io")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let problem: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(problem["type"], "Internal");
    assert_eq!(problem["detail"], "disk unavailable");
}

#[tokio::test]
async fn panics_become_problem_details() {
    let (status, _, body) = send(get_request("/panic")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let problem: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(problem["type"], "Panic");
    assert_eq!(problem["detail"], "handler exploded");
}

#[tokio::test]
async fn incoming_request_id_is_kept() {
    let request = Request::builder()
        .uri("/invalid")
        .header("x-request-id", "caller-supplied-id")
        .body(Body::empty())
        .expect("request");
    let (_, headers, body) = send(request).await;

    assert_eq!(
        headers.get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("caller-supplied-id")
    );
    let problem: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(problem["requestId"], "caller-supplied-id");
}

#[tokio::test]
async fn unknown_route_gets_status_code_page() {
    let (status, headers, body) = send(get_request("/nowhere")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());
    assert!(content_type.is_some_and(|v| v.starts_with("text/plain")));
    assert_eq!(String::from_utf8(body).expect("utf8"), "Status Code: 404; Not Found");
}

#[tokio::test]
async fn protected_route_requires_bearer_token() {
    let (status, headers, body) = send(get_request("/secure")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).and_then(|v| v.to_str().ok()), Some("Bearer"));
    assert_eq!(String::from_utf8(body).expect("utf8"), "Status Code: 401; Unauthorized");
}

#[tokio::test]
async fn valid_token_reaches_handler_with_principal() {
    let request = Request::builder()
        .uri("/secure")
        .header(header::AUTHORIZATION, bearer())
        .body(Body::empty())
        .expect("request");
    let (status, _, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"secure");

    let request = Request::builder()
        .uri("/whoami")
        .header(header::AUTHORIZATION, bearer())
        .body(Body::empty())
        .expect("request");
    let (status, _, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"integration");
}

#[tokio::test]
async fn system_endpoints_answer_without_token() {
    let (status, headers, body) = send(get_request("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers.get(header::CACHE_CONTROL).is_some());
    let health: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(health["status"], "up");

    let (status, _, body) = send(get_request("/alive")).await;
    assert_eq!(status, StatusCode::OK);
    let alive: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(alive["status"], "alive");
}
