//! Handler errors and the fault record the exception handler turns into
//! problem details.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::any::Any;
use std::borrow::Cow;
use std::fmt;

/// Open set of error categories; the name becomes the problem `type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FaultCategory(Cow<'static, str>);

impl FaultCategory {
    /// The request asked for something the current state does not allow (400).
    pub const INVALID_OPERATION: Self = Self(Cow::Borrowed("InvalidOperation"));
    pub const INTERNAL: Self = Self(Cow::Borrowed("Internal"));
    /// A handler panicked.
    pub const PANIC: Self = Self(Cow::Borrowed("Panic"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned by HTTP handlers.
///
/// Any error convertible into [`anyhow::Error`] becomes an `Internal` fault
/// through `?`; use the constructors to pick another category.
pub struct ApiError {
    category: FaultCategory,
    source: anyhow::Error,
}

impl ApiError {
    pub fn new(category: FaultCategory, source: impl Into<anyhow::Error>) -> Self {
        Self { category, source: source.into() }
    }

    pub fn invalid_operation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(FaultCategory::INVALID_OPERATION, anyhow::Error::msg(message.into()))
    }

    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(FaultCategory::INTERNAL, anyhow::Error::msg(message.into()))
    }

    #[must_use]
    pub fn with_category(mut self, category: FaultCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub const fn category(&self) -> &FaultCategory {
        &self.category
    }

    #[must_use]
    pub const fn source(&self) -> &anyhow::Error {
        &self.source
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::new(FaultCategory::INTERNAL, err)
    }
}

impl fmt::Debug for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiError")
            .field("category", &self.category)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.source)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        UnhandledFault::from(self).into_response()
    }
}

/// Response extension marking a request that failed with an unhandled fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnhandledFault {
    pub category: FaultCategory,
    /// Top-level message, shown to clients as the problem `detail`.
    pub detail: String,
    /// Full cause chain, for logs only.
    pub chain: String,
}

impl UnhandledFault {
    pub fn new(category: FaultCategory, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self { category, chain: detail.clone(), detail }
    }
}

impl From<ApiError> for UnhandledFault {
    fn from(err: ApiError) -> Self {
        Self {
            category: err.category,
            detail: err.source.to_string(),
            chain: format!("{:#}", err.source),
        }
    }
}

impl IntoResponse for UnhandledFault {
    /// Body-less `500`; the exception handler writes the final response.
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Panic hook for `CatchPanicLayer::custom`.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "Handler panicked".to_owned());

    UnhandledFault::new(FaultCategory::PANIC, detail).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn foreign_errors_become_internal_faults() {
        fn parse(raw: &str) -> Result<u16, ApiError> {
            Ok(raw.parse::<u16>()?)
        }

        let err = parse("not-a-port").expect_err("parse failure");
        assert_eq!(err.category(), &FaultCategory::INTERNAL);
        assert!(err.to_string().starts_with("Internal: "));
    }

    #[test]
    fn into_response_carries_fault_without_body() {
        let err = ApiError::from(io::Error::other("disk gone"))
            .with_category(FaultCategory::new("Storage"));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let fault = response.extensions().get::<UnhandledFault>().expect("fault attached");
        assert_eq!(fault.category.name(), "Storage");
        assert_eq!(fault.detail, "disk gone");
    }

    #[test]
    fn invalid_operation_keeps_message() {
        let fault = UnhandledFault::from(ApiError::invalid_operation("Order already shipped"));
        assert_eq!(fault.category, FaultCategory::INVALID_OPERATION);
        assert_eq!(fault.detail, "Order already shipped");
    }

    #[test]
    fn panic_payloads_are_described() {
        let response = panic_response(Box::new("boom"));
        let fault = response.extensions().get::<UnhandledFault>().expect("fault");
        assert_eq!(fault.category, FaultCategory::PANIC);
        assert_eq!(fault.detail, "boom");

        let response = panic_response(Box::new(String::from("owned boom")));
        let fault = response.extensions().get::<UnhandledFault>().expect("fault");
        assert_eq!(fault.detail, "owned boom");

        let response = panic_response(Box::new(42_u8));
        let fault = response.extensions().get::<UnhandledFault>().expect("fault");
        assert_eq!(fault.detail, "Handler panicked");
    }
}
