use thiserror::Error;

/// Failure while producing book records from the external source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network request failed: {0}")]
    Network(String),
    #[error("failed to parse listing markup: {0}")]
    Parse(String),
}

/// Failure in the persistence layer. Adapters map their driver errors into
/// this so the core stays driver-agnostic.
#[derive(Debug, Error)]
#[error("storage error: {message}")]
pub struct StorageError {
    message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
