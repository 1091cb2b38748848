use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level API configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub open_api: OpenApiConfig,
    pub identity: IdentityConfig,
    pub scalar: ScalarConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(from = "ApiConfigInner")]
pub struct ApiConfig {
    inner: Arc<ApiConfigInner>,
}

impl From<ApiConfigInner> for ApiConfig {
    fn from(inner: ApiConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
}

/// Static parts of the `OpenAPI` document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenApiConfig {
    pub title: String,
    pub description: String,
}

/// Identity provider registration (Entra ID style) and bearer token checks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Authority base URL, e.g. `https://login.microsoftonline.com/`.
    pub instance: String,
    pub tenant_id: String,
    pub client_id: String,
    /// Application ID URI prefixed to every scope, e.g. `api://scaffold`.
    pub app_identifier: String,
    /// Space-separated scope names.
    pub scopes: String,
    pub jwt: JwtConfig,
}

impl IdentityConfig {
    /// Configured scope names, without the application prefix.
    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.scopes.split_whitespace()
    }

    /// Scope names prefixed with the application identifier (`{app}/{scope}`).
    #[must_use]
    pub fn qualified_scopes(&self) -> Vec<String> {
        self.scope_names().map(|scope| format!("{}/{scope}", self.app_identifier)).collect()
    }
}

/// Shared-secret JWT validation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

/// Defaults of the interactive API reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScalarConfig {
    pub preferred_security_scheme: String,
}

/// Logger settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `compact`, `pretty` or `json`.
    pub format: String,
    /// Extra filter directives, e.g. `scaffold=debug,tower_http=info`.
    pub directives: Option<String>,
    /// Enables the rolling file sink when set.
    pub directory: Option<PathBuf>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 8080 }
    }
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            title: "Scaffold API".to_owned(),
            description: "Web API service template".to_owned(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            instance: "https://login.microsoftonline.com/".to_owned(),
            tenant_id: "common".to_owned(),
            client_id: String::new(),
            app_identifier: "api://scaffold".to_owned(),
            scopes: "user_impersonation".to_owned(),
            jwt: JwtConfig::default(),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self { secret: "dev-only-change-me".to_owned(), issuer: None, audience: None }
    }
}

impl Default for ScalarConfig {
    fn default() -> Self {
        Self { preferred_security_scheme: "none".to_owned() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: None,
            directory: None,
        }
    }
}
