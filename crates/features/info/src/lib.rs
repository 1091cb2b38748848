//! Info feature module: service version, redacted configuration and the
//! list of registered modules.
//!
//! | Route | Access |
//! |---|---|
//! | `GET /info/version` | anonymous |
//! | `GET /info/config` | bearer token |
//! | `GET /info/modules` | bearer token |

mod error;
mod handlers;
pub mod redact;
pub mod runtime;

pub use crate::error::InfoError;

use crate::runtime::RuntimeFacts;
use scaffold_kernel::prelude::*;
use utoipa_axum::routes;

#[derive(Debug, Default, Clone, Copy)]
pub struct InfoModule;

impl FeatureModule for InfoModule {
    fn info(&self) -> FeatureModuleInfo {
        FeatureModuleInfo::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    fn register(&self, context: &mut ModuleContext) -> Result<(), ModuleError> {
        let facts = RuntimeFacts::capture();
        tracing::debug!(
            runtime = facts.runtime_identifier,
            os = %facts.os_version,
            "Runtime facts captured"
        );
        context.services_mut().insert(facts);
        Ok(())
    }

    fn map_endpoints(&self, routes: RouteTable) -> RouteTable {
        routes
            .routes(routes!(handlers::version))
            .protected_routes(routes!(handlers::config))
            .protected_routes(routes!(handlers::modules))
    }
}
