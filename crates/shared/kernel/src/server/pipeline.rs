//! Middleware stack wrapped around the assembled router.
//!
//! Outermost first: request id, tracing, request id propagation, status code
//! pages, exception handler, panic catcher.

use crate::server::error::panic_response;
use crate::server::problem::{StatusCodeSelector, exception_handler};
use axum::Router;
use axum::body::{Body, HttpBody};
use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue, header};
use axum::middleware::{Next, from_fn, from_fn_with_state};
use axum::response::Response;
use scaffold_domain::constants::REQUEST_ID_HEADER;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info_span;

/// Generates request ids from the safe `NanoID` alphabet.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafeRequestId;

impl MakeRequestId for SafeRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&crate::safe_nanoid!(16)).ok().map(RequestId::new)
    }
}

/// Wraps `router` in the request pipeline.
pub fn apply(router: Router, selector: StatusCodeSelector) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), SafeRequestId))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default();
                info_span!("request", method = %request.method(), uri = %request.uri(), request_id)
            }))
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(from_fn(status_code_pages))
            .layer(from_fn_with_state(selector, exception_handler))
            .layer(CatchPanicLayer::custom(panic_response)),
    )
}

/// Gives body-less error responses a short plain-text body,
/// e.g. `Status Code: 404; Not Found`.
pub async fn status_code_pages(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    let is_error = status.is_client_error() || status.is_server_error();
    if !is_error
        || response.headers().contains_key(header::CONTENT_TYPE)
        || response.body().size_hint().exact() != Some(0)
    {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    let reason = status.canonical_reason().unwrap_or("Unknown");
    let body = format!("Status Code: {}; {reason}", status.as_u16());
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(body))
}
