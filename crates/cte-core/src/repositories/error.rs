use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Store initialization failed: {message}")]
    InitializationError { message: String },

    #[error("Store write rejected: {message}")]
    WriteFailed { message: String },
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
