use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("ingredient dataset could not be loaded: {0}")]
    Dataset(String),
}

/// Failure reported by a key/value store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("failed to read key {key}: {message}")]
    Read { key: String, message: String },

    #[error("failed to write key {key}: {message}")]
    Write { key: String, message: String },

    #[error("storage location unavailable: {0}")]
    Unavailable(String),
}
