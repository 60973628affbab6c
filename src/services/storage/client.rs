//! Key-value storage interface used by the credential store.
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer errors (io/serialization/value).
///
/// Note:
/// - Kept independent from `AppError` so callers can decide how to fail
///   (the navigation guard fails closed and treats a read error as "no credential").
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("invalid storage value: {0}")]
    InvalidValue(String),
}

/// A minimal persistent key-value storage, shaped like the browser's `localStorage`.
///
/// - Values are UTF-8 strings.
/// - Implementations must not cache: every `get_item` reflects the latest write,
///   including writes made by another process sharing the same backing store.
pub trait KeyValueStorage: Send + Sync {
    // Returns the storage backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Get the value stored under `key`.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    // Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    // Remove `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> StorageResult<()>;
}
