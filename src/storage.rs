//! Storage backends for index files.
//!
//! The index only talks to the [`Storage`] trait: [`file::FileStorage`] keeps
//! files in a directory, [`memory::MemoryStorage`] keeps them in memory.
//! [`structured`] provides the checksummed binary writer and reader used
//! for segment files.

pub mod file;
pub mod memory;
pub mod structured;
pub mod traits;

pub use traits::{Storage, StorageConfig, StorageInput, StorageLock, StorageOutput};
