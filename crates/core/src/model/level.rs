use serde::{Deserialize, Serialize};

use crate::model::ids::LevelId;

/// A level with the current user's progress, as returned by `user_levels`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_unlocked: bool,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub max_score: u32,
    #[serde(default)]
    pub percentage_score: f64,
    #[serde(default)]
    pub has_passed: bool,
}

/// Levels in server order.
///
/// Position in this list and `Level::number` are independent; navigation
/// always follows list position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelList(Vec<Level>);

impl LevelList {
    #[must_use]
    pub fn new(levels: Vec<Level>) -> Self {
        Self(levels)
    }

    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: LevelId) -> Option<&Level> {
        self.0.iter().find(|level| level.id == id)
    }

    #[must_use]
    pub fn position(&self, id: LevelId) -> Option<usize> {
        self.0.iter().position(|level| level.id == id)
    }

    /// The level listed right after `id`, if `id` is present and not last.
    #[must_use]
    pub fn next_after(&self, id: LevelId) -> Option<&Level> {
        let index = self.position(id)?;
        self.0.get(index + 1)
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &Level> {
        self.0.iter().filter(|level| level.is_unlocked)
    }
}

impl From<Vec<Level>> for LevelList {
    fn from(levels: Vec<Level>) -> Self {
        Self(levels)
    }
}
