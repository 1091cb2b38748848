//! Well-known names shared between routing, documentation and diagnostics.

/// `OpenAPI` tag of the default endpoints.
pub const SYSTEM_TAG: &str = "System";
/// `OpenAPI` tag of the diagnostic endpoints.
pub const INFO_TAG: &str = "Info";

/// Security scheme id of the OAuth2 authorization-code flow.
pub const OAUTH2_SCHEME: &str = "oauth2";
/// Security scheme id of the HTTP bearer scheme.
pub const BEARER_SCHEME: &str = "bearer";

/// Replacement for redacted configuration values.
pub const REDACTED: &str = "******";

/// Environment names with special meaning.
pub const DEVELOPMENT: &str = "Development";
pub const PRODUCTION: &str = "Production";

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
