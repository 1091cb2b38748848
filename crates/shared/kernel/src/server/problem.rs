//! Problem details (`application/problem+json`) for unhandled faults.

use crate::server::error::{FaultCategory, UnhandledFault};
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use fxhash::FxHashMap;
use scaffold_domain::constants::REQUEST_ID_HEADER;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, warn};

pub const PROBLEM_JSON: &str = "application/problem+json";
pub const PROBLEM_TITLE: &str = "An error occurred";

/// Standard problem details body. Extensions are written as top-level members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl ProblemDetails {
    /// Problem for `fault`, answered with `status`.
    pub fn for_fault(fault: &UnhandledFault, status: StatusCode) -> Self {
        Self {
            kind: fault.category.name().to_owned(),
            title: PROBLEM_TITLE.to_owned(),
            status: status.as_u16(),
            detail: Some(fault.detail.clone()),
            instance: None,
            extensions: Map::new(),
        }
    }

    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    #[must_use]
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }
}

impl IntoResponse for ProblemDetails {
    /// Falls back to a body-less status when the body cannot be serialized.
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match serde_json::to_vec(&self) {
            Ok(body) => {
                let content_type = [(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON))];
                (status, content_type, body).into_response()
            },
            Err(err) => {
                warn!(error = %err, "Failed to serialize problem details");
                status.into_response()
            },
        }
    }
}

/// Maps fault categories to response status codes.
#[derive(Debug, Clone)]
pub struct StatusCodeSelector {
    statuses: Arc<FxHashMap<FaultCategory, StatusCode>>,
    fallback: StatusCode,
}

impl StatusCodeSelector {
    /// Selector without any mapping; every category gets `fallback`.
    #[must_use]
    pub fn empty(fallback: StatusCode) -> Self {
        Self { statuses: Arc::default(), fallback }
    }

    /// Adds or replaces the status of `category`.
    #[must_use]
    pub fn with(mut self, category: FaultCategory, status: StatusCode) -> Self {
        Arc::make_mut(&mut self.statuses).insert(category, status);
        self
    }

    #[must_use]
    pub fn select(&self, category: &FaultCategory) -> StatusCode {
        self.statuses.get(category).copied().unwrap_or(self.fallback)
    }
}

impl Default for StatusCodeSelector {
    /// `InvalidOperation` is a client error, everything else a server error.
    fn default() -> Self {
        Self::empty(StatusCode::INTERNAL_SERVER_ERROR)
            .with(FaultCategory::INVALID_OPERATION, StatusCode::BAD_REQUEST)
    }
}

/// Middleware writing problem details for responses that carry an
/// [`UnhandledFault`]. Other responses pass through untouched.
pub async fn exception_handler(
    State(selector): State<StatusCodeSelector>,
    request: Request,
    next: Next,
) -> Response {
    let instance = format!("{} {}", request.method(), request.uri().path());
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let response = next.run(request).await;
    let Some(fault) = response.extensions().get::<UnhandledFault>() else {
        return response;
    };

    let status = selector.select(&fault.category);
    error!(
        category = %fault.category,
        status = status.as_u16(),
        request_id = request_id.as_deref().unwrap_or_default(),
        %instance,
        "Unhandled fault: {}",
        fault.chain
    );

    let mut problem = ProblemDetails::for_fault(fault, status).with_instance(instance);
    if let Some(request_id) = request_id {
        problem = problem.with_extension("requestId", request_id);
    }
    problem.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selector_maps_invalid_operation_to_bad_request() {
        let selector = StatusCodeSelector::default();
        assert_eq!(selector.select(&FaultCategory::INVALID_OPERATION), StatusCode::BAD_REQUEST);
        assert_eq!(selector.select(&FaultCategory::INTERNAL), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(selector.select(&FaultCategory::PANIC), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            selector.select(&FaultCategory::new("Anything")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn selector_accepts_new_categories() {
        let conflict = FaultCategory::new("Conflict");
        let selector = StatusCodeSelector::default().with(conflict.clone(), StatusCode::CONFLICT);
        assert_eq!(selector.select(&conflict), StatusCode::CONFLICT);
        assert_eq!(selector.select(&FaultCategory::INVALID_OPERATION), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn problem_serializes_with_flattened_extensions() {
        let fault = UnhandledFault::new(FaultCategory::INVALID_OPERATION, "nope");
        let problem = ProblemDetails::for_fault(&fault, StatusCode::BAD_REQUEST)
            .with_instance("GET /orders")
            .with_extension("requestId", "abc123");

        let json = serde_json::to_value(&problem).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "type": "InvalidOperation",
                "title": "An error occurred",
                "status": 400,
                "detail": "nope",
                "instance": "GET /orders",
                "requestId": "abc123",
            })
        );
    }

    #[test]
    fn problem_response_uses_problem_content_type() {
        let fault = UnhandledFault::new(FaultCategory::INTERNAL, "boom");
        let response =
            ProblemDetails::for_fault(&fault, StatusCode::INTERNAL_SERVER_ERROR).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).map(HeaderValue::as_bytes),
            Some(PROBLEM_JSON.as_bytes())
        );
    }
}
