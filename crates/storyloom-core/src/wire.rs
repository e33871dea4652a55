//! JSON encoding of entity ids.
//!
//! Ids occupy the full 64-bit range, which JSON consumers commonly parse as
//! doubles. They are therefore written as decimal strings; both strings and
//! plain numbers are accepted on input. Use the submodules with
//! `#[serde(with = "...")]`.

use serde::Deserialize;
use serde::de;

use crate::error::DomainError;

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    fn into_id<E: de::Error>(self) -> Result<i64, E> {
        match self {
            Self::Number(id) => Ok(id),
            Self::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid id {text:?}"))),
        }
    }
}

/// Parses an id from a path segment or other free text.
///
/// # Errors
///
/// Returns `DomainError::Validation` if `text` is not a decimal `i64`.
pub fn parse_id(text: &str) -> Result<i64, DomainError> {
    text.trim()
        .parse()
        .map_err(|_| DomainError::Validation(format!("invalid id {text:?}")))
}

/// A single id.
pub mod id {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::WireId;

    /// Writes the id as a string.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    /// Reads an id from a string or number.
    ///
    /// # Errors
    ///
    /// Fails for anything that is not an `i64`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        WireId::deserialize(deserializer)?.into_id()
    }
}

/// An optional id; `null` or a missing field is `None`.
pub mod opt_id {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::WireId;

    /// Writes the id as a string, or `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(id: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => serializer.serialize_some(&id.to_string()),
            None => serializer.serialize_none(),
        }
    }

    /// Reads an optional id from a string, number or `null`.
    ///
    /// # Errors
    ///
    /// Fails for anything that is not an `i64` or `null`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        Option::<WireId>::deserialize(deserializer)?
            .map(WireId::into_id)
            .transpose()
    }
}

/// A list of ids.
pub mod ids {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::WireId;

    /// Writes every id as a string.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(ids: &[i64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(ids.iter().map(ToString::to_string))
    }

    /// Reads a list of strings or numbers.
    ///
    /// # Errors
    ///
    /// Fails if any element is not an `i64`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
        Vec::<WireId>::deserialize(deserializer)?
            .into_iter()
            .map(WireId::into_id)
            .collect()
    }
}

/// A map whose values are ids, such as an edit history or an asset table.
/// Keys keep their own encoding.
pub mod id_values {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::WireId;

    /// Writes every value as a string.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors, including keys that cannot be map keys.
    pub fn serialize<K, S>(map: &BTreeMap<K, i64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        S: Serializer,
    {
        serializer.collect_map(map.iter().map(|(key, id)| (key, id.to_string())))
    }

    /// Reads a map whose values are strings or numbers.
    ///
    /// # Errors
    ///
    /// Fails if a key does not parse or any value is not an `i64`.
    pub fn deserialize<'de, K, D>(deserializer: D) -> Result<BTreeMap<K, i64>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        D: Deserializer<'de>,
    {
        BTreeMap::<K, WireId>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, id)| id.into_id().map(|id| (key, id)))
            .collect()
    }
}
