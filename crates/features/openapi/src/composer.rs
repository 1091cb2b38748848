//! Per-request `OpenAPI` document composition.

use crate::error::{OpenApiError, OpenApiErrorExt};
use crate::transformers::{
    BearerScheme, DocumentInfo, OAuth2Scheme, OperationSecurity, RequestServers,
};
use axum::http::{HeaderMap, Uri, header};
use scaffold_domain::config::ApiConfig;
use scaffold_domain::environment::HostEnvironment;
use scaffold_kernel::prelude::AuthorizationMetadata;
use std::fmt;
use url::Url;
use utoipa::openapi::OpenApi;

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";
const HTTP_SCHEMES: [&str; 2] = ["http", "https"];

/// Where the document is being served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub scheme: String,
    pub host: Option<String>,
}

impl RequestInfo {
    /// Proxy headers first, then the `Host` header and the request URI.
    /// Values that do not form a plain `http(s)://host[:port]` origin are
    /// skipped.
    #[must_use]
    pub fn from_request(headers: &HeaderMap, uri: &Uri) -> Self {
        let scheme = first_value(headers, FORWARDED_PROTO)
            .map(|proto| proto.to_ascii_lowercase())
            .filter(|proto| HTTP_SCHEMES.contains(&proto.as_str()))
            .or_else(|| uri.scheme_str().map(str::to_owned))
            .unwrap_or_else(|| "http".to_owned());
        let origin = |host: &str| origin_authority(&scheme, host);
        let host = first_value(headers, FORWARDED_HOST)
            .and_then(|host| origin(&host))
            .or_else(|| first_value(headers, header::HOST.as_str()).and_then(|host| origin(&host)))
            .or_else(|| uri.authority().and_then(|authority| origin(authority.as_str())));

        Self { scheme, host }
    }

    /// `{scheme}://{host}` without a trailing slash.
    #[must_use]
    pub fn server_url(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        Some(format!("{}://{host}", self.scheme).trim_end_matches('/').to_owned())
    }
}

/// Normalized `host[:port]` when `{scheme}://{host}` is an origin without
/// credentials, path, query or fragment.
fn origin_authority(scheme: &str, host: &str) -> Option<String> {
    let url = Url::parse(&format!("{scheme}://{host}")).ok()?;
    let plain = HTTP_SCHEMES.contains(&url.scheme())
        && url.username().is_empty()
        && url.password().is_none()
        && url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none();
    if !plain {
        return None;
    }

    let host = url.host_str()?;
    Some(url.port().map_or_else(|| host.to_owned(), |port| format!("{host}:{port}")))
}

fn first_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    (!first.is_empty()).then(|| first.to_owned())
}

/// Inputs shared by every transformer during one composition.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    /// Absent when composing outside of a request.
    pub request: Option<&'a RequestInfo>,
    pub authorization: &'a AuthorizationMetadata,
}

/// One mutation step over the document. Steps must be idempotent.
pub trait DocumentTransformer: Send + Sync + 'static {
    fn transform(&self, document: &mut OpenApi, context: &TransformContext<'_>);
}

/// Document facts resolved from configuration at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSettings {
    pub title: String,
    pub description: String,
    pub version: String,
    pub environment: String,
    pub authorization_url: String,
    pub token_url: String,
    /// `(qualified scope, scope name)` pairs, e.g. `("api://app/read", "read")`.
    pub scopes: Vec<(String, String)>,
}

impl DocumentSettings {
    /// # Errors
    /// Returns an error if the identity authority does not form valid absolute URLs.
    pub fn from_config(
        config: &ApiConfig,
        environment: &HostEnvironment,
        version: &str,
    ) -> Result<Self, OpenApiError> {
        let identity = &config.identity;
        let authority = format!("{}{}", identity.instance, identity.tenant_id);
        let authority = authority.trim_end_matches('/');

        Url::parse(authority).context(format!("authority '{authority}'"))?;
        let authorization_url = Url::parse(&format!("{authority}/oauth2/v2.0/authorize"))
            .context("authorization endpoint")?;
        let token_url =
            Url::parse(&format!("{authority}/oauth2/v2.0/token")).context("token endpoint")?;

        let scopes = identity
            .scope_names()
            .map(|scope| (format!("{}/{scope}", identity.app_identifier), scope.to_owned()))
            .collect();

        Ok(Self {
            title: config.open_api.title.clone(),
            description: config.open_api.description.clone(),
            version: version.to_owned(),
            environment: environment.name.to_string(),
            authorization_url: authorization_url.into(),
            token_url: token_url.into(),
            scopes,
        })
    }

    /// Qualified scope names in configuration order.
    #[must_use]
    pub fn qualified_scopes(&self) -> Vec<String> {
        self.scopes.iter().map(|(qualified, _)| qualified.clone()).collect()
    }
}

/// Ordered transformer pipeline, registered as a service by the module.
#[derive(Default)]
pub struct DocumentComposer {
    transformers: Vec<Box<dyn DocumentTransformer>>,
}

impl DocumentComposer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Info, servers, OAuth2 scheme, bearer scheme, operation security.
    #[must_use]
    pub fn standard(settings: &DocumentSettings) -> Self {
        Self::new()
            .with(DocumentInfo::new(settings))
            .with(RequestServers)
            .with(OAuth2Scheme::new(settings))
            .with(BearerScheme)
            .with(OperationSecurity::new(settings.qualified_scopes()))
    }

    /// Appends a step; steps run in insertion order.
    #[must_use]
    pub fn with(mut self, transformer: impl DocumentTransformer) -> Self {
        self.transformers.push(Box::new(transformer));
        self
    }

    pub fn apply(&self, document: &mut OpenApi, context: &TransformContext<'_>) {
        for transformer in &self.transformers {
            transformer.transform(document, context);
        }
    }

    /// Fresh document: a clone of `base` with every step applied.
    #[must_use]
    pub fn compose(&self, base: &OpenApi, context: &TransformContext<'_>) -> OpenApi {
        let mut document = base.clone();
        self.apply(&mut document, context);
        document
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }
}

impl fmt::Debug for DocumentComposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentComposer").field("steps", &self.transformers.len()).finish()
    }
}
