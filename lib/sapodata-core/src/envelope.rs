//! The SAP OData v2 JSON envelope.
//!
//! A single entity comes back as `{"d": <entity>}`, an entity set as
//! `{"d": {"results": [<entity>, ...]}}`. The wrappers here are generic over
//! any `serde` type, so one decode path serves every entity type.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

use crate::{Result, from_json};

/// `{"d": T}`: exactly one entity under the `d` key.
///
/// The key is mandatory even when `T` is an `Option`: a missing `d` is a
/// decode failure, not an absent value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct EntityEnvelope<T> {
    /// The unwrapped entity.
    #[serde(rename = "d", deserialize_with = "required")]
    pub entity: T,
}

impl<T> EntityEnvelope<T> {
    /// Wrap an entity.
    pub const fn new(entity: T) -> Self {
        Self { entity }
    }
}

/// `{"d": {"results": [T, ...]}}`: an ordered entity set.
///
/// Sibling keys such as `__count` or `__next` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct EntitySetEnvelope<T> {
    /// The `d` object.
    #[serde(rename = "d", deserialize_with = "required")]
    pub set: EntitySet<T>,
}

/// Body of an [`EntitySetEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct EntitySet<T> {
    /// Entities, in server order.
    #[serde(deserialize_with = "required")]
    pub results: Vec<T>,
}

impl<T> EntitySetEnvelope<T> {
    /// Wrap an ordered list of entities.
    pub const fn new(entities: Vec<T>) -> Self {
        Self {
            set: EntitySet { results: entities },
        }
    }

    /// Consume into the entities.
    pub fn into_entities(self) -> Vec<T> {
        self.set.results
    }
}

// `deserialize_with` turns off serde's "missing Option field means None" rule.
fn required<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer)
}

/// Decode a single-entity envelope.
///
/// # Errors
///
/// Returns [`crate::Error::Parsing`] naming the structural violation
/// (missing `d`, type mismatch, ...).
///
/// # Example
///
/// ```
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct Product { id: String }
///
/// let product: Product = sapodata_core::decode_one(br#"{"d":{"id":"42"}}"#).unwrap();
/// assert_eq!(product.id, "42");
/// ```
pub fn decode_one<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    from_json::<EntityEnvelope<T>>(body).map(|envelope| envelope.entity)
}

/// Decode an entity-set envelope, preserving element order.
///
/// # Errors
///
/// Returns [`crate::Error::Parsing`] naming the structural violation.
pub fn decode_many<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>> {
    from_json::<EntitySetEnvelope<T>>(body).map(EntitySetEnvelope::into_entities)
}
