use storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Password verification failed")]
    VerificationError,

    #[error("Session secret must be set")]
    MissingSecret,

    #[error("Password task failed: {0}")]
    TaskError(String),

    #[error("Session encoding failed: {0}")]
    SessionEncodingError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, AuthError>;
