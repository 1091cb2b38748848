use axum::{Extension, Router};
use scaffold::kernel::prelude::{ApiDescription, ApiState, RouteTable};
use scaffold::kernel::server::pipeline;
use scaffold::kernel::server::problem::StatusCodeSelector;
use scaffold::kernel::server::registry::RegisteredModules;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

#[derive(OpenApi)]
struct ApiDoc;

pub(crate) fn init(state: ApiState, modules: &RegisteredModules) -> Router {
    let routes = RouteTable::with_router(OpenApiRouter::with_openapi(ApiDoc::openapi()), &state)
        .merge(scaffold::server::router::system_router());

    // Separate the routes from the route-derived API description
    let (router, authorization) = modules.map_endpoints(routes).into_parts();
    let (router, api_doc) = router.split_for_parts();

    let router =
        router.layer(Extension(ApiDescription::new(api_doc, authorization))).with_state(state);

    pipeline::apply(router, StatusCodeSelector::default())
}
