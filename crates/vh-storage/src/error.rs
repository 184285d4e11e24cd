//! Object storage error types.

/// Errors from the image store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing object store rejected the operation.
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// The key is not a valid object path.
    #[error("Invalid object key: {0}")]
    InvalidKey(#[from] object_store::path::Error),

    /// Local fallback directory could not be prepared.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage section missing required values.
    #[error("Storage not configured: {0}")]
    NotConfigured(String),
}
