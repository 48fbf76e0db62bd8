use quiz_core::model::LevelId;
use storage::repository::LocalStore;

use crate::error::QuizError;

/// Pick the level to quiz on: an explicit request parameter first, then the
/// remembered `currentLevelId`.
///
/// A blank or unparseable parameter is ignored in favour of the stored value.
///
/// # Errors
///
/// Returns `QuizError::MissingLevel` when no usable id is found and
/// `QuizError::Storage` when the local store cannot be read.
pub async fn resolve_level_id(
    param: Option<&str>,
    store: &dyn LocalStore,
) -> Result<LevelId, QuizError> {
    if let Some(raw) = param.map(str::trim).filter(|raw| !raw.is_empty()) {
        match raw.parse::<LevelId>() {
            Ok(level_id) => return Ok(level_id),
            Err(err) => tracing::warn!(error = %err, "ignoring level parameter"),
        }
    }

    let stored = store.current_level_id().await?;
    let Some(raw) = stored.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Err(QuizError::MissingLevel);
    };
    raw.parse::<LevelId>().map_err(|err| {
        tracing::warn!(error = %err, "stored level id is unusable");
        QuizError::MissingLevel
    })
}
