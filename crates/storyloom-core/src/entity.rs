//! Persisted entity abstraction.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// An entity kept in a key-by-id store.
///
/// `version` is the optimistic-concurrency stamp: a store accepts an update
/// only when the supplied version matches the stored one, then bumps it.
pub trait Entity: Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable name of the entity type, used as the store partition key.
    const KIND: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> i64;

    /// Returns the version the entity was loaded at.
    fn version(&self) -> i64;

    /// Overwrites the version stamp. Only stores call this.
    fn set_version(&mut self, version: i64);
}
