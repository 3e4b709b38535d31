use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MemoryError {
    #[error("invalid memory configuration: {0}")]
    InvalidConfiguration(String),
}
