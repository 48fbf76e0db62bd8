use async_trait::async_trait;
use quiz_core::model::LevelId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key under which the last selected or unlocked level is remembered.
pub const CURRENT_LEVEL_KEY: &str = "currentLevelId";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Small persisted key/value store local to this client.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value; missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove_value(&self, key: &str) -> Result<(), StorageError>;

    /// Raw stored level id. Parsing is left to the caller so that a corrupt
    /// value can be reported rather than silently dropped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn current_level_id(&self) -> Result<Option<String>, StorageError> {
        self.get_value(CURRENT_LEVEL_KEY).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_current_level_id(&self, id: LevelId) -> Result<(), StorageError> {
        self.set_value(CURRENT_LEVEL_KEY, &id.to_string()).await
    }
}

/// Simple in-memory store for tests and for running without a database.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStore for InMemoryRepository {
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove_value(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Storage handles behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub local: Arc<dyn LocalStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let local: Arc<dyn LocalStore> = Arc::new(InMemoryRepository::new());
        Self { local }
    }
}
