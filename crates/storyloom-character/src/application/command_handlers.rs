//! Command handlers for the Character Catalogue context.

use storyloom_core::command::Command;
use storyloom_core::error::DomainError;
use storyloom_core::id::IdGenerator;
use storyloom_core::repository::{Repository, modify_entity};
use tracing::info;

use crate::domain::aggregates::Character;
use crate::domain::commands::{CreateCharacter, UpdateCharacter};

/// Handles the `CreateCharacter` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the name is blank, or the store
/// error of the insert.
pub async fn handle_create_character(
    command: &CreateCharacter,
    ids: &IdGenerator,
    characters: &dyn Repository<Character>,
) -> Result<i64, DomainError> {
    if command.name.trim().is_empty() {
        return Err(DomainError::Validation(
            "character name must not be empty".into(),
        ));
    }

    let character_id = ids.next_id();
    characters
        .insert(&Character::new(
            character_id,
            command.name.trim(),
            command.slug.trim(),
        ))
        .await?;

    info!(
        correlation_id = %command.correlation_id,
        command = command.command_type(),
        character_id,
        "character created"
    );

    Ok(character_id)
}

/// Handles the `UpdateCharacter` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the character does not exist, or the
/// store error of the update.
pub async fn handle_update_character(
    command: &UpdateCharacter,
    characters: &dyn Repository<Character>,
) -> Result<Character, DomainError> {
    let character = modify_entity(characters, command.character_id, |character| {
        if !command.name.is_empty() {
            character.name.clone_from(&command.name);
        }
        if !command.slug.is_empty() {
            character.slug.clone_from(&command.slug);
        }
        if !command.color.is_empty() {
            character.color.clone_from(&command.color);
        }
        if !command.emotions.is_empty() {
            character.emotions.clone_from(&command.emotions);
        }
        Ok(())
    })
    .await?;

    info!(
        correlation_id = %command.correlation_id,
        command = command.command_type(),
        character_id = character.id,
        "character updated"
    );

    Ok(character)
}
