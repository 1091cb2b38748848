use scaffold_derive::scaffold_error;
use std::borrow::Cow;

#[scaffold_error]
pub enum LoaderError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Parse error{}: {message}", format_context(.context))]
    Parse { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<String, LoaderError> {
    std::fs::read_to_string("missing.toml").context("Reading missing.toml")
}

fn parse(raw: &str) -> Result<u16, LoaderError> {
    raw.parse::<u16>()
        .map_err(|e| LoaderError::Parse { message: e.to_string().into(), context: None })
}

fn main() {
    let err = read().expect_err("file does not exist");
    assert!(err.to_string().contains("(Reading missing.toml)"));

    let err = parse("port").context("server.port").expect_err("not a number");
    assert!(err.to_string().starts_with("Parse error (server.port)"));

    let internal: LoaderError = "boom".into();
    assert_eq!(internal.to_string(), "Internal error: boom");
}
