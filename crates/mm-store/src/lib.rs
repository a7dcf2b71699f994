//! Persistence for mind maps.
//!
//! `MapStore` implements the load/save contract the editor depends on over
//! any string key-value `KvBackend`.

pub mod backend;
pub mod store;

pub use backend::{DirBackend, KvBackend, MemoryBackend};
pub use store::{INDEX_KEY, MAP_PREFIX, MapStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}
