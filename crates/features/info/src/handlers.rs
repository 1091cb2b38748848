use crate::runtime::{self, RuntimeFacts};
use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use scaffold_derive::{api_handler, api_model};
use scaffold_domain::constants::INFO_TAG;
use scaffold_kernel::prelude::*;

#[api_model(rename_all = "PascalCase")]
/// Build and runtime facts about the running service.
pub(crate) struct Info {
    /// The name of the service.
    name: String,
    /// The version of the service.
    version: String,
    /// The date and time of the request.
    date_time: DateTime<Utc>,
    /// The environment the service is running in.
    environment: String,
    /// The compiler the service was built with.
    framework_description: String,
    /// The platform identifier and version on which the service is running.
    #[serde(rename = "OSVersion")]
    os_version: String,
    /// The build date of the service.
    build_date: String,
    /// The platform architecture on which the service is running.
    #[serde(rename = "OSArchitecture")]
    os_architecture: String,
    /// The target triple the service was built for.
    runtime_identifier: String,
}

#[api_model]
/// A registered feature module.
pub(crate) struct ModuleInfo {
    name: String,
    version: String,
}

#[api_handler(
    get,
    path = "/info/version",
    operation_id = "GetVersion",
    summary = "Get service version",
    responses((status = OK, description = "Service version and runtime facts", body = Info)),
    tag = INFO_TAG,
)]
pub(crate) async fn version(State(state): State<ApiState>) -> Result<Json<Info>, ApiError> {
    let facts = state.try_service::<RuntimeFacts>()?;

    Ok(Json(Info {
        name: state.environment.application_name.to_string(),
        version: state.environment.application_version.to_string(),
        date_time: Utc::now(),
        environment: state.environment.name.to_string(),
        framework_description: facts.framework_description.to_owned(),
        os_version: facts.os_version.clone(),
        build_date: runtime::build_date()?,
        os_architecture: facts.os_architecture.to_owned(),
        runtime_identifier: facts.runtime_identifier.to_owned(),
    }))
}

#[api_handler(
    get,
    path = "/info/config",
    operation_id = "GetConfig",
    responses(
        (
            status = OK,
            description = "Redacted configuration, one `key = value (provider)` line per key",
            body = String,
            content_type = "text/plain",
        ),
    ),
    tag = INFO_TAG,
)]
pub(crate) async fn config(State(state): State<ApiState>) -> String {
    crate::redact::redacted_dump(&state.config_view)
}

#[api_handler(
    get,
    path = "/info/modules",
    operation_id = "GetModules",
    responses((status = OK, description = "Registered feature modules", body = Vec<ModuleInfo>)),
    tag = INFO_TAG,
)]
pub(crate) async fn modules(State(state): State<ApiState>) -> Json<Vec<ModuleInfo>> {
    let modules = state
        .modules
        .iter()
        .map(|module| ModuleInfo {
            name: module.name.to_string(),
            version: module.version.to_string(),
        })
        .collect();
    Json(modules)
}
