//! Unified Error Model
use thiserror::Error;

/// Failure reported by a [`crate::storage::KeyValueStore`] backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("io error on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum MockupError {
    #[error("PERSIST/{0}")]
    Persistence(#[from] StorageError),

    #[error("NOTFOUND/{0}")]
    NotFound(String),

    #[error("SERIALIZE/{0}")]
    Serialization(#[from] serde_json::Error),

    #[error("PRODUCER/{0}")]
    Producer(String),

    #[error("CONFIG/{0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MockupError>;
