use crate::server::auth::{TokenValidator, require_authorization};
use crate::server::state::ApiState;
use axum::http::Method;
use axum::middleware::from_fn_with_state;
use axum::routing::MethodRouter;
use fxhash::FxHashSet;
use scaffold_domain::environment::HostEnvironment;
use std::fmt;
use utoipa::openapi::path::{Operation, PathItem, Paths};
use utoipa_axum::router::{OpenApiRouter, UtoipaMethodRouter};

/// `(path, method)` pairs that require an authenticated caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationMetadata {
    protected: FxHashSet<(String, Method)>,
}

impl AuthorizationMetadata {
    pub fn insert(&mut self, path: impl Into<String>, method: Method) {
        self.protected.insert((path.into(), method));
    }

    /// Records every operation documented in `paths`.
    pub fn extend_from_paths(&mut self, paths: &Paths) {
        for (path, item) in &paths.paths {
            for (method, _) in operations(item) {
                self.insert(path.clone(), method);
            }
        }
    }

    #[must_use]
    pub fn requires_authorization(&self, path: &str, method: &Method) -> bool {
        self.protected.iter().any(|(p, m)| p == path && m == method)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.protected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.protected.is_empty()
    }
}

/// Endpoints contributed by the system router and feature modules.
#[must_use]
pub struct RouteTable {
    router: OpenApiRouter<ApiState>,
    tokens: TokenValidator,
    environment: HostEnvironment,
    authorization: AuthorizationMetadata,
}

impl RouteTable {
    /// Empty table guarding protected routes with the state's token validator.
    pub fn new(state: &ApiState) -> Self {
        Self::with_router(OpenApiRouter::new(), state)
    }

    /// Table extending `router`, e.g. one created from a base `OpenAPI` document.
    pub fn with_router(router: OpenApiRouter<ApiState>, state: &ApiState) -> Self {
        Self {
            router,
            tokens: state.tokens.clone(),
            environment: state.environment.clone(),
            authorization: AuthorizationMetadata::default(),
        }
    }

    /// Environment the routes are mapped for; some endpoints exist only in `Development`.
    #[must_use]
    pub const fn environment(&self) -> &HostEnvironment {
        &self.environment
    }

    /// Documented, anonymous routes.
    pub fn routes(mut self, routes: UtoipaMethodRouter<ApiState>) -> Self {
        self.router = self.router.routes(routes);
        self
    }

    /// Documented routes that require a valid bearer token.
    pub fn protected_routes(mut self, routes: UtoipaMethodRouter<ApiState>) -> Self {
        let (schemas, paths, method_router) = routes;
        self.authorization.extend_from_paths(&paths);

        let guard = from_fn_with_state(self.tokens.clone(), require_authorization);
        self.router = self.router.routes((schemas, paths, method_router.route_layer(guard)));
        self
    }

    /// Route left out of the `OpenAPI` document.
    pub fn route(mut self, path: &str, method_router: MethodRouter<ApiState>) -> Self {
        self.router = self.router.route(path, method_router);
        self
    }

    /// Merges a prebuilt router, such as the system router.
    pub fn merge(mut self, router: OpenApiRouter<ApiState>) -> Self {
        self.router = self.router.merge(router);
        self
    }

    #[must_use]
    pub const fn authorization(&self) -> &AuthorizationMetadata {
        &self.authorization
    }

    #[must_use]
    pub fn into_parts(self) -> (OpenApiRouter<ApiState>, AuthorizationMetadata) {
        (self.router, self.authorization)
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("environment", &self.environment.name)
            .field("authorization", &self.authorization)
            .finish_non_exhaustive()
    }
}

/// Operations of a path item with their HTTP methods.
pub fn operations(item: &PathItem) -> impl Iterator<Item = (Method, &Operation)> {
    [
        (Method::GET, item.get.as_ref()),
        (Method::PUT, item.put.as_ref()),
        (Method::POST, item.post.as_ref()),
        (Method::DELETE, item.delete.as_ref()),
        (Method::OPTIONS, item.options.as_ref()),
        (Method::HEAD, item.head.as_ref()),
        (Method::PATCH, item.patch.as_ref()),
        (Method::TRACE, item.trace.as_ref()),
    ]
    .into_iter()
    .filter_map(|(method, operation)| operation.map(|operation| (method, operation)))
}

/// Mutable variant of [`operations`].
pub fn operations_mut(item: &mut PathItem) -> impl Iterator<Item = (Method, &mut Operation)> {
    [
        (Method::GET, item.get.as_mut()),
        (Method::PUT, item.put.as_mut()),
        (Method::POST, item.post.as_mut()),
        (Method::DELETE, item.delete.as_mut()),
        (Method::OPTIONS, item.options.as_mut()),
        (Method::HEAD, item.head.as_mut()),
        (Method::PATCH, item.patch.as_mut()),
        (Method::TRACE, item.trace.as_mut()),
    ]
    .into_iter()
    .filter_map(|(method, operation)| operation.map(|operation| (method, operation)))
}
