use crate::server::routes::AuthorizationMetadata;
use std::sync::Arc;
use utoipa::openapi::OpenApi;

/// Route-derived `OpenAPI` document and its authorization metadata.
///
/// Installed as a request extension once the router is assembled; the
/// document composer starts every request from a clone of `base`.
#[derive(Debug, Clone)]
pub struct ApiDescription {
    pub base: Arc<OpenApi>,
    pub authorization: Arc<AuthorizationMetadata>,
}

impl ApiDescription {
    #[must_use]
    pub fn new(base: OpenApi, authorization: AuthorizationMetadata) -> Self {
        Self { base: Arc::new(base), authorization: Arc::new(authorization) }
    }
}
