use std::borrow::Cow;

#[scaffold_derive::scaffold_error]
pub enum OpenApiError {
    #[error("Invalid identity URL{}: {source}", format_context(.context))]
    InvalidUrl { source: url::ParseError, context: Option<Cow<'static, str>> },
}
