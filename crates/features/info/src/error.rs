use std::borrow::Cow;

#[scaffold_derive::scaffold_error]
pub enum InfoError {
    #[error("Executable metadata error{}: {source}", format_context(.context))]
    Metadata { source: std::io::Error, context: Option<Cow<'static, str>> },
}
