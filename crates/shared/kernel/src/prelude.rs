//! Everything a feature module needs to define services and endpoints.

pub use crate::server::auth::Principal;
pub use crate::server::error::{ApiError, FaultCategory};
pub use crate::server::openapi::ApiDescription;
pub use crate::server::registry::{FeatureModule, ModuleContext, ModuleError};
pub use crate::server::routes::{AuthorizationMetadata, RouteTable};
pub use crate::server::state::ApiState;
pub use scaffold_domain::config::ApiConfig;
pub use scaffold_domain::environment::HostEnvironment;
pub use scaffold_domain::registry::FeatureModuleInfo;
