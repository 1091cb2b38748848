//! Standard document transformers. Every step overwrites what it owns, so a
//! document can be transformed any number of times.

use crate::composer::{DocumentSettings, DocumentTransformer, TransformContext};
use scaffold_domain::constants::{BEARER_SCHEME, OAUTH2_SCHEME};
use scaffold_kernel::server::routes::operations_mut;
use utoipa::openapi::extensions::ExtensionsBuilder;
use utoipa::openapi::security::{
    AuthorizationCode, Flow, HttpAuthScheme, HttpBuilder, OAuth2, Scopes, SecurityRequirement,
    SecurityScheme,
};
use utoipa::openapi::{Components, OpenApi, RefOr, Response, Server};

/// Title, description and version from configuration. Clears the servers.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    title: String,
    description: String,
    version: String,
}

impl DocumentInfo {
    #[must_use]
    pub fn new(settings: &DocumentSettings) -> Self {
        Self {
            title: settings.title.clone(),
            description: format!(
                "{} - Environment: {}",
                settings.description, settings.environment
            ),
            version: format!("Version {}", settings.version),
        }
    }
}

impl DocumentTransformer for DocumentInfo {
    fn transform(&self, document: &mut OpenApi, _context: &TransformContext<'_>) {
        document.info.title.clone_from(&self.title);
        document.info.description = Some(self.description.clone());
        document.info.version.clone_from(&self.version);
        document.servers = None;
    }
}

/// Single server entry pointing back at the requesting host.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestServers;

impl DocumentTransformer for RequestServers {
    fn transform(&self, document: &mut OpenApi, context: &TransformContext<'_>) {
        let Some(url) = context.request.and_then(|request| request.server_url()) else {
            return;
        };
        document.servers = Some(vec![Server::new(url)]);
    }
}

/// OAuth2 authorization code flow with PKCE.
#[derive(Debug, Clone)]
pub struct OAuth2Scheme {
    authorization_url: String,
    token_url: String,
    scopes: Vec<(String, String)>,
}

impl OAuth2Scheme {
    #[must_use]
    pub fn new(settings: &DocumentSettings) -> Self {
        Self {
            authorization_url: settings.authorization_url.clone(),
            token_url: settings.token_url.clone(),
            scopes: settings.scopes.clone(),
        }
    }

    fn scheme(&self) -> SecurityScheme {
        let mut flow = AuthorizationCode::new(
            self.authorization_url.clone(),
            self.token_url.clone(),
            Scopes::from_iter(self.scopes.iter().cloned()),
        );
        flow.extensions = Some(ExtensionsBuilder::new().add("x-usePkce", "SHA-256").build());

        SecurityScheme::OAuth2(OAuth2::new([Flow::AuthorizationCode(flow)]))
    }
}

impl DocumentTransformer for OAuth2Scheme {
    fn transform(&self, document: &mut OpenApi, _context: &TransformContext<'_>) {
        document
            .components
            .get_or_insert_with(Components::default)
            .add_security_scheme(OAUTH2_SCHEME, self.scheme());
    }
}

/// HTTP bearer token scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerScheme;

impl DocumentTransformer for BearerScheme {
    fn transform(&self, document: &mut OpenApi, _context: &TransformContext<'_>) {
        let scheme = HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build();
        document
            .components
            .get_or_insert_with(Components::default)
            .add_security_scheme(BEARER_SCHEME, SecurityScheme::Http(scheme));
    }
}

/// Marks protected operations: 401/403 responses and `oauth2` OR `bearer`.
#[derive(Debug, Clone)]
pub struct OperationSecurity {
    scopes: Vec<String>,
}

impl OperationSecurity {
    #[must_use]
    pub const fn new(scopes: Vec<String>) -> Self {
        Self { scopes }
    }
}

impl DocumentTransformer for OperationSecurity {
    fn transform(&self, document: &mut OpenApi, context: &TransformContext<'_>) {
        let requirements = [
            SecurityRequirement::new(OAUTH2_SCHEME, self.scopes.iter().cloned()),
            SecurityRequirement::new(BEARER_SCHEME, self.scopes.iter().cloned()),
        ];

        for (path, item) in document.paths.paths.iter_mut() {
            for (method, operation) in operations_mut(item) {
                if !context.authorization.requires_authorization(path, &method) {
                    continue;
                }

                let responses = &mut operation.responses.responses;
                responses.insert("401".to_owned(), RefOr::T(Response::new("Unauthorized")));
                responses.insert("403".to_owned(), RefOr::T(Response::new("Forbidden")));

                let security = operation.security.get_or_insert_with(Vec::new);
                for requirement in &requirements {
                    if !security.contains(requirement) {
                        security.push(requirement.clone());
                    }
                }
            }
        }
    }
}
