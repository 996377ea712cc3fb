//! Device-local key/value persistence.
//!
//! The pipeline only needs a single localStorage-like slot (the anonymous
//! user identifier), so the store interface is a synchronous get/set over
//! string keys. Absence of a key means "not yet generated".

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },
}

/// A key/value slot persisted across client restarts on one device.
pub trait DeviceStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
