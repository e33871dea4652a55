//! Commands for the Character Catalogue context.

use std::collections::BTreeMap;

use storyloom_core::command::Command;
use uuid::Uuid;

/// Command to add a character to the catalogue.
#[derive(Debug, Clone)]
pub struct CreateCharacter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Display name; must not be blank.
    pub name: String,
    /// Short handle.
    pub slug: String,
}

/// Command to edit a character. Empty strings and an empty emotion map
/// leave the corresponding field unchanged.
#[derive(Debug, Clone)]
pub struct UpdateCharacter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The character to edit.
    pub character_id: i64,
    /// New display name.
    pub name: String,
    /// New handle.
    pub slug: String,
    /// New color.
    pub color: String,
    /// Replacement emotion map.
    pub emotions: BTreeMap<i64, i64>,
}

impl Command for CreateCharacter {
    fn command_type(&self) -> &'static str {
        "character.create"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for UpdateCharacter {
    fn command_type(&self) -> &'static str {
        "character.update"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
