//! Query handlers for the Character Catalogue context.

use std::collections::BTreeMap;

use serde::Serialize;
use storyloom_core::error::DomainError;
use storyloom_core::repository::Repository;
use storyloom_core::wire;

use crate::domain::aggregates::Character;

/// Read-only view of a character.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterView {
    /// The character identifier.
    #[serde(with = "wire::id")]
    pub character_id: i64,
    /// Display name.
    pub name: String,
    /// Short handle.
    pub slug: String,
    /// Display color.
    pub color: String,
    /// Emotion index to asset id.
    #[serde(with = "wire::id_values")]
    pub emotions: BTreeMap<i64, i64>,
}

impl From<Character> for CharacterView {
    fn from(character: Character) -> Self {
        Self {
            character_id: character.id,
            name: character.name,
            slug: character.slug,
            color: character.color,
            emotions: character.emotions,
        }
    }
}

/// Retrieves the whole catalogue, ordered by id.
///
/// # Errors
///
/// Returns the store error if the query fails.
pub async fn get_characters(
    characters: &dyn Repository<Character>,
) -> Result<Vec<CharacterView>, DomainError> {
    let all = characters.query_all(&|_: &Character| true).await?;
    Ok(all.into_iter().map(CharacterView::from).collect())
}
