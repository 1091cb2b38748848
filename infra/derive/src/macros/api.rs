use super::derived_traits;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ItemFn, ItemStruct, Lit, LitBool, LitStr, MetaNameValue, Token};

#[derive(Default)]
struct ModelArgs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: Option<LitBool>,
}

/// Serde container options already written on the struct by hand.
#[derive(Default)]
struct ExistingSerde {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

pub fn expand_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    match model_attrs(args, &input) {
        Ok(attrs) => quote! {
            #attrs
            #input
        },
        Err(err) => err.to_compile_error(),
    }
}

pub fn expand_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[::utoipa::path(#args)]
        #vis #sig #block
    }
}

fn model_attrs(args: TokenStream, input: &ItemStruct) -> syn::Result<TokenStream> {
    let args = parse_model_args(args)?;
    let existing = existing_serde(&input.attrs)?;
    let present = derived_traits(&input.attrs);

    let mut derives = Vec::new();
    if !present.contains("Debug") {
        derives.push(quote! { Debug });
    }
    if !present.contains("Serialize") {
        derives.push(quote! { ::serde::Serialize });
    }
    if !present.contains("Deserialize") {
        derives.push(quote! { ::serde::Deserialize });
    }
    if !present.contains("ToSchema") {
        derives.push(quote! { ::utoipa::ToSchema });
    }
    let derive = if derives.is_empty() { quote! {} } else { quote! { #[derive(#(#derives),*)] } };

    let rename = args.rename_all.unwrap_or_else(|| LitStr::new("camelCase", Span::call_site()));
    let rename = match existing.rename_all {
        Some(current) if current.value() != rename.value() => {
            return Err(syn::Error::new_spanned(
                current,
                "Conflicting serde rename_all; remove it or pass the same value to api_model",
            ));
        },
        Some(_) => quote! {},
        None => quote! { #[serde(rename_all = #rename)] },
    };

    let deny = args.deny_unknown_fields.as_ref().is_none_or(|lit| lit.value);
    let deny = match (existing.deny_unknown_fields, deny) {
        (true, false) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "deny_unknown_fields is already set via serde; remove it before disabling",
            ));
        },
        (false, true) => quote! { #[serde(deny_unknown_fields)] },
        _ => quote! {},
    };

    Ok(quote! {
        #derive
        #rename
        #deny
    })
}

fn parse_model_args(args: TokenStream) -> syn::Result<ModelArgs> {
    let metas = Punctuated::<MetaNameValue, Token![,]>::parse_terminated.parse2(args)?;
    let mut parsed = ModelArgs::default();

    for meta in metas {
        let Expr::Lit(expr) = &meta.value else {
            return Err(syn::Error::new_spanned(&meta.value, "expected a literal value"));
        };
        match &expr.lit {
            Lit::Str(value) if meta.path.is_ident("rename_all") => {
                if parsed.rename_all.replace(value.clone()).is_some() {
                    return Err(syn::Error::new_spanned(&meta, "Duplicate argument"));
                }
            },
            Lit::Bool(value) if meta.path.is_ident("deny_unknown_fields") => {
                if parsed.deny_unknown_fields.replace(value.clone()).is_some() {
                    return Err(syn::Error::new_spanned(&meta, "Duplicate argument"));
                }
            },
            _ => {
                return Err(syn::Error::new_spanned(
                    &meta,
                    "Unsupported argument; expected rename_all = \"..\" or deny_unknown_fields = bool",
                ));
            },
        }
    }

    Ok(parsed)
}

fn existing_serde(attrs: &[Attribute]) -> syn::Result<ExistingSerde> {
    let mut existing = ExistingSerde::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                existing.rename_all = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("deny_unknown_fields") {
                existing.deny_unknown_fields = true;
            } else if meta.input.peek(Token![=]) {
                // Skip the value of any other key-value option.
                let _: Expr = meta.value()?.parse()?;
            }
            Ok(())
        })?;
    }

    Ok(existing)
}
