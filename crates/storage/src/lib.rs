#![forbid(unsafe_code)]

pub mod documents;
pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryKeyValueStore, KeyValueStore, Storage, StorageError, StorageTier};
