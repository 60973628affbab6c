pub mod client;
pub mod file;
pub mod memory;

pub use client::{KeyValueStorage, StorageError, StorageResult};
pub use file::FileStorage;
pub use memory::MemoryStorage;
