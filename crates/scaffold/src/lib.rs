//! Facade crate for the Scaffold API feature modules and shared libraries.
//! Re-exports domain/kernel primitives and lists the modules the host registers.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `scaffold` with the desired feature flags (`info`/`openapi`, both on by default).
//! - Pass [`modules`] to the kernel's `ModuleRegistry` at startup.

pub use scaffold_domain as domain;
pub use scaffold_kernel as kernel;

use scaffold_kernel::server::registry::FeatureModule;
use std::sync::Arc;

pub mod server {
    pub mod router {
        pub use scaffold_kernel::server::router::system_router;
    }
}

/// Feature modules compiled into this build.
pub mod features {
    #[cfg(feature = "info")]
    pub use scaffold_info as info;
    #[cfg(feature = "openapi")]
    pub use scaffold_openapi as openapi;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "info")]
        "info",
        #[cfg(feature = "openapi")]
        "openapi",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Every enabled feature module, in registration order.
#[must_use]
pub fn modules() -> Vec<Arc<dyn FeatureModule>> {
    let mut modules: Vec<Arc<dyn FeatureModule>> = Vec::new();

    #[cfg(feature = "info")]
    modules.push(Arc::new(features::info::InfoModule));

    #[cfg(feature = "openapi")]
    modules.push(Arc::new(features::openapi::OpenApiModule));

    modules
}
