use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use quiz_core::model::{LevelId, LevelList, SubmissionResult};
use storage::repository::{LocalStore, StorageError};

use crate::api::ProgressApi;
use crate::error::{ApiError, LevelError};

/// Default pause before re-fetching levels after a pass, so the unlock message can be read.
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(1500);

const EVENT_CAPACITY: usize = 16;

/// Broadcast to level-selection screens after the level list was re-fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelsRefreshed {
    pub levels: LevelList,
    pub unlocked: usize,
}

/// Owns the cached ordered level list and the remembered current level.
pub struct LevelService {
    api: Arc<dyn ProgressApi>,
    store: Arc<dyn LocalStore>,
    cache: RwLock<Option<LevelList>>,
    events: broadcast::Sender<LevelsRefreshed>,
}

impl LevelService {
    #[must_use]
    pub fn new(api: Arc<dyn ProgressApi>, store: Arc<dyn LocalStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            store,
            cache: RwLock::new(None),
            events,
        }
    }

    /// Fetch the user's levels and replace the cache.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the level list cannot be fetched; the cache is left untouched.
    pub async fn load_levels(&self) -> Result<LevelList, ApiError> {
        let levels = self.api.user_levels().await?;
        tracing::info!(count = levels.len(), "loaded level progress");
        self.replace_cache(levels.clone());
        Ok(levels)
    }

    /// Seed or replace the cache without a network call.
    pub fn replace_cache(&self, levels: LevelList) {
        let mut guard = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(levels);
    }

    #[must_use]
    pub fn cached(&self) -> Option<LevelList> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Level listed right after `level_id` in the cached list.
    #[must_use]
    pub fn next_level_after(&self, level_id: LevelId) -> Option<LevelId> {
        let guard = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .and_then(|levels| levels.next_after(level_id))
            .map(|level| level.id)
    }

    /// Fill in `next_level_id` for a passed result when the server left it out.
    ///
    /// A server-supplied value is never replaced.
    #[must_use]
    pub fn complete_next_level(
        &self,
        level_id: LevelId,
        mut result: SubmissionResult,
    ) -> SubmissionResult {
        if result.has_passed && result.next_level_id.is_none() {
            result.next_level_id = self.next_level_after(level_id);
            if let Some(next) = result.next_level_id {
                tracing::info!(%level_id, next_level_id = %next, "derived next level from cached list");
            }
        }
        result
    }

    /// Remember `level_id` as the level to open on the next quiz start.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the local store cannot be written.
    pub async fn select_level(&self, level_id: LevelId) -> Result<(), StorageError> {
        self.store.set_current_level_id(level_id).await?;
        tracing::debug!(%level_id, "current level stored");
        Ok(())
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LevelsRefreshed> {
        self.events.subscribe()
    }

    /// Re-fetch levels, update the cache and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns `LevelError::Api` if the fetch fails; nothing is broadcast then.
    pub async fn refresh(&self) -> Result<LevelList, LevelError> {
        let levels = self.load_levels().await?;
        let unlocked = levels.unlocked().count();
        tracing::info!(unlocked, "level data refreshed");
        // no subscribers is fine
        let _ = self.events.send(LevelsRefreshed {
            levels: levels.clone(),
            unlocked,
        });
        Ok(levels)
    }

    /// Run `refresh` once after `delay` on a background task.
    pub fn schedule_refresh(self: &Arc<Self>, delay: Duration) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = this.refresh().await {
                tracing::error!(error = %err, "failed to refresh level data");
            }
        })
    }
}
