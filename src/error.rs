use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read program image")]
    Image(#[from] std::io::Error),

    #[error("program image is empty (expected at least an origin word)")]
    EmptyImage,
}
