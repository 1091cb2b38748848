#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Attribute macros shared by every crate of the workspace: error enums,
//! HTTP data models and documented Axum handlers.
//!
//! The examples below are `ignore`d because a proc-macro crate cannot use its
//! own macros; the consuming crates' tests exercise them.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Declares a domain error enum.
///
/// * Adds `#[derive(Debug, thiserror::Error)]` unless already present.
/// * Emits a `<Name>Ext` trait with `.context(..)` for `Result<T, Name>` and for
///   `Result<T, Source>` of every source-carrying variant.
/// * Emits `From<Source>` for every variant with a `source` field (or a field
///   marked `#[source]`/`#[from]`).
/// * Emits `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * Emits a private `format_context` helper used in `#[error(..)]` strings.
///
/// Every variant must use named fields, and a variant with a source must also
/// carry `context: Option<Cow<'static, str>>`.
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[scaffold_derive::scaffold_error]
/// pub enum LoaderError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read() -> Result<String, LoaderError> {
///     std::fs::read_to_string("server.toml").context("Reading server.toml")
/// }
/// ```
#[proc_macro_attribute]
pub fn scaffold_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}

/// Declares an HTTP data model.
///
/// Adds `Debug`, `serde::Serialize`, `serde::Deserialize` and `utoipa::ToSchema`
/// when missing, plus `#[serde(rename_all = "camelCase")]` and
/// `#[serde(deny_unknown_fields)]` by default.
///
/// Arguments: `rename_all = "..."`, `deny_unknown_fields = false`.
///
/// ```rust,ignore
/// #[scaffold_derive::api_model(rename_all = "PascalCase")]
/// pub struct Info {
///     pub name: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_model(attr.into(), input).into()
}

/// Registers an Axum handler with `utoipa::path`.
///
/// Accepts the regular `utoipa::path` arguments (`get`, `path = ".."`,
/// `responses(..)`, `tag = ..`).
///
/// ```rust,ignore
/// #[scaffold_derive::api_handler(
///     get,
///     path = "/health",
///     responses((status = OK, body = HealthResponse)),
///     tag = "System"
/// )]
/// pub async fn health_handler() -> impl IntoResponse { /* .. */ }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_handler(args.into(), input).into()
}
