use scaffold_derive::scaffold_error;

#[scaffold_error]
pub enum LoaderError {
    #[error("IO error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
}

fn main() {}
