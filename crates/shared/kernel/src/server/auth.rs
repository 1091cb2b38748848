//! Bearer token guard for protected routes.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use scaffold_domain::config::JwtConfig;
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[scaffold_derive::scaffold_error]
pub enum AuthError {
    #[error("Token rejected{}: {source}", format_context(.context))]
    Token { source: jsonwebtoken::errors::Error, context: Option<Cow<'static, str>> },
}

/// Caller identity taken from a validated token, available to protected
/// handlers as `Extension<Principal>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: Option<String>,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: Option<String>,
    /// Space-separated delegated scopes.
    #[serde(default)]
    scp: Option<String>,
}

/// Validates HS256 bearer tokens signed with the configured shared secret.
#[derive(Clone)]
pub struct TokenValidator {
    inner: Arc<(DecodingKey, Validation)>,
}

impl TokenValidator {
    #[must_use]
    pub fn from_config(jwt: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &jwt.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &jwt.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self { inner: Arc::new((DecodingKey::from_secret(jwt.secret.as_bytes()), validation)) }
    }

    /// # Errors
    /// Returns an error if the signature, expiry, issuer or audience check fails.
    pub fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        let (key, validation) = &*self.inner;
        let claims = decode::<Claims>(token, key, validation).context("Bearer token")?.claims;

        Ok(Principal {
            subject: claims.sub,
            scopes: claims.scp.unwrap_or_default().split_whitespace().map(str::to_owned).collect(),
        })
    }
}

impl fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenValidator").finish_non_exhaustive()
    }
}

/// Middleware answering `401` with `WWW-Authenticate: Bearer` unless the
/// request carries a valid token. The handler never runs for rejected calls.
pub async fn require_authorization(
    State(tokens): State<TokenValidator>,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = match bearer_token(request.headers()).map(|token| tokens.validate(token)) {
        Some(Ok(principal)) => principal,
        Some(Err(err)) => {
            debug!(error = %err, path = %request.uri().path(), "Bearer token rejected");
            return unauthorized();
        },
        None => return unauthorized(),
    };

    request.extensions_mut().insert(principal);
    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim()).filter(|token| !token.is_empty())
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, [(header::WWW_AUTHENTICATE, "Bearer")]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn token(secret: &str, claims: &serde_json::Value) -> String {
        let key = EncodingKey::from_secret(secret.as_bytes());
        encode(&Header::default(), claims, &key).expect("encode")
    }

    fn far_future() -> u64 {
        4_102_444_800 // 2100-01-01
    }

    #[test]
    fn bearer_token_requires_scheme_and_value() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer   "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[test]
    fn valid_token_yields_principal() {
        let validator = TokenValidator::from_config(&JwtConfig::default());
        let jwt = token(
            &JwtConfig::default().secret,
            &serde_json::json!({
                "sub": "alice",
                "scp": "user_impersonation orders.read",
                "exp": far_future(),
            }),
        );

        let principal = validator.validate(&jwt).expect("valid token");
        assert_eq!(principal.subject.as_deref(), Some("alice"));
        assert_eq!(principal.scopes, ["user_impersonation", "orders.read"]);
    }

    #[test]
    fn wrong_secret_and_expired_tokens_are_rejected() {
        let validator = TokenValidator::from_config(&JwtConfig::default());

        let forged =
            token("other-secret", &serde_json::json!({ "sub": "mallory", "exp": far_future() }));
        assert!(validator.validate(&forged).is_err());

        let secret = JwtConfig::default().secret;
        let expired = token(&secret, &serde_json::json!({ "sub": "bob", "exp": 1_000 }));
        assert!(validator.validate(&expired).is_err());
    }

    #[test]
    fn issuer_and_audience_are_checked_when_configured() {
        let jwt_config = JwtConfig {
            issuer: Some("https://issuer".to_owned()),
            audience: Some("api://scaffold".to_owned()),
            ..JwtConfig::default()
        };
        let validator = TokenValidator::from_config(&jwt_config);

        let good = token(
            &jwt_config.secret,
            &serde_json::json!({
                "iss": "https://issuer",
                "aud": "api://scaffold",
                "exp": far_future(),
            }),
        );
        assert!(validator.validate(&good).is_ok());

        let bad = token(
            &jwt_config.secret,
            &serde_json::json!({
                "iss": "https://elsewhere",
                "aud": "api://scaffold",
                "exp": far_future(),
            }),
        );
        assert!(validator.validate(&bad).is_err());
    }
}
