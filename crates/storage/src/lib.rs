#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{CURRENT_LEVEL_KEY, InMemoryRepository, LocalStore, Storage, StorageError};
