//! Entities of the Character Catalogue context.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use storyloom_core::entity::Entity;

/// A character that chapters can cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Entity identifier.
    pub id: i64,
    /// Optimistic-concurrency stamp.
    #[serde(default)]
    pub version: i64,
    /// Display name.
    pub name: String,
    /// Short handle used by authors.
    #[serde(default)]
    pub slug: String,
    /// Display color, e.g. `#aa3300`.
    #[serde(default)]
    pub color: String,
    /// Emotion index to asset id.
    #[serde(default)]
    pub emotions: BTreeMap<i64, i64>,
}

impl Character {
    /// Creates a character without color or emotions.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            version: 0,
            name: name.into(),
            slug: slug.into(),
            color: String::new(),
            emotions: BTreeMap::new(),
        }
    }
}

impl Entity for Character {
    const KIND: &'static str = "character";

    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}
