//! OpenApi feature module.
//!
//! Serves the route-derived document, composed per request, at `/openapi`
//! (`?format=yaml` for YAML) and the Scalar reference at `/scalar`. Both
//! routes exist only in the `Development` environment.

pub mod composer;
mod error;
mod handlers;
pub mod scalar;
pub mod transformers;

pub use crate::composer::{
    DocumentComposer, DocumentSettings, DocumentTransformer, RequestInfo, TransformContext,
};
pub use crate::error::OpenApiError;
pub use crate::scalar::ScalarOptions;

use axum::routing::get;
use scaffold_kernel::prelude::*;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct OpenApiModule;

impl FeatureModule for OpenApiModule {
    fn info(&self) -> FeatureModuleInfo {
        FeatureModuleInfo::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    fn register(&self, context: &mut ModuleContext) -> Result<(), ModuleError> {
        let version = env!("CARGO_PKG_VERSION");
        let settings =
            DocumentSettings::from_config(context.config(), context.environment(), version)
                .map_err(|err| ModuleError::registration(env!("CARGO_PKG_NAME"), err.to_string()))?;
        debug!(
            authorization_url = %settings.authorization_url,
            scopes = settings.scopes.len(),
            "OpenAPI settings resolved"
        );

        let scalar = ScalarOptions::from_config(context.config());
        let services = context.services_mut();
        services.insert(DocumentComposer::standard(&settings));
        services.insert(scalar);
        Ok(())
    }

    fn map_endpoints(&self, routes: RouteTable) -> RouteTable {
        if !routes.environment().is_development() {
            return routes;
        }

        routes.route("/openapi", get(handlers::document)).route("/scalar", get(handlers::reference))
    }
}
