//! Key-value store adapters the short-link registry persists through.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use pinhole_core::{KeyValueStore, StorageError};
