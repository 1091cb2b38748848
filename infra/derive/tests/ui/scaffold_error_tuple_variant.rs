use scaffold_derive::scaffold_error;

#[scaffold_error]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(std::io::Error),
}

fn main() {}
