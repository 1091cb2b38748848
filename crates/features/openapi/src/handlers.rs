use crate::composer::{DocumentComposer, RequestInfo, TransformContext};
use crate::scalar::ScalarOptions;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use axum::{Extension, Json};
use scaffold_kernel::prelude::*;
use serde::Deserialize;
use utoipa::openapi::OpenApi;
use utoipa_scalar::Scalar;

const YAML: &str = "application/yaml";

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DocumentQuery {
    #[serde(default)]
    format: DocumentFormat,
}

fn compose(
    state: &ApiState,
    description: &ApiDescription,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<OpenApi, ApiError> {
    let composer = state.try_service::<DocumentComposer>()?;
    let request = RequestInfo::from_request(headers, uri);
    let context =
        TransformContext { request: Some(&request), authorization: &description.authorization };

    Ok(composer.compose(&description.base, &context))
}

pub(crate) async fn document(
    State(state): State<ApiState>,
    Extension(description): Extension<ApiDescription>,
    Query(query): Query<DocumentQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ApiError> {
    let document = compose(&state, &description, &headers, &uri)?;

    match query.format {
        DocumentFormat::Json => Ok(Json(document).into_response()),
        DocumentFormat::Yaml => {
            let body = document.to_yaml()?;
            Ok(([(header::CONTENT_TYPE, HeaderValue::from_static(YAML))], body).into_response())
        }
    }
}

pub(crate) async fn reference(
    State(state): State<ApiState>,
    Extension(description): Extension<ApiDescription>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Html<String>, ApiError> {
    let document = compose(&state, &description, &headers, &uri)?;
    let options = state.try_service::<ScalarOptions>()?;

    Ok(Html(Scalar::new(document).custom_html(options.html()).to_html()))
}
