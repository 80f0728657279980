//! Envelope decoding with an optional persistence side effect.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    EntityEnvelope, EntitySetEnvelope, PersistenceError, PersistentStore, Result, envelope,
    from_json,
};

/// Decodes envelopes into caller types and, when a store is attached,
/// mirrors the decoded entities into it.
///
/// Without a store, decoding is a pure transform. With one, every call opens
/// a fresh context, merges each entity, and commits before returning; a
/// merge or commit failure is reported as [`crate::Error::Persistence`] and
/// the context is discarded.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use sapodata_core::{EntityDecoder, MemoryStore};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Product { id: String }
///
/// let store = MemoryStore::new().with_key_properties(["id"]);
/// let decoder = EntityDecoder::with_store(Arc::new(store.clone()));
///
/// let products: Vec<Product> = decoder
///     .decode_many(br#"{"d":{"results":[{"id":"1"},{"id":"2"}]}}"#)
///     .unwrap();
/// assert_eq!(products.len(), 2);
/// assert_eq!(store.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct EntityDecoder {
    store: Option<Arc<dyn PersistentStore>>,
}

impl std::fmt::Debug for EntityDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityDecoder")
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

impl EntityDecoder {
    /// A decoder without persistence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A decoder mirroring entities into `store`.
    #[must_use]
    pub fn with_store(store: Arc<dyn PersistentStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Whether decoded entities are persisted.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Decode `{"d": T}`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Parsing`] on a shape violation,
    /// [`crate::Error::Persistence`] if the store rejects the entity.
    pub fn decode_one<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T> {
        let entity = envelope::decode_one(body)?;
        if let Some(store) = &self.store {
            let raw: EntityEnvelope<Value> = from_json(body)?;
            mirror(store.as_ref(), std::slice::from_ref(&raw.entity))?;
        }
        Ok(entity)
    }

    /// Decode `{"d": {"results": [T]}}`, preserving order.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Parsing`] on a shape violation,
    /// [`crate::Error::Persistence`] if the store rejects an entity.
    pub fn decode_many<T: DeserializeOwned>(&self, body: &[u8]) -> Result<Vec<T>> {
        let entities = envelope::decode_many(body)?;
        if let Some(store) = &self.store {
            let raw: EntitySetEnvelope<Value> = from_json(body)?;
            mirror(store.as_ref(), &raw.set.results)?;
        }
        Ok(entities)
    }
}

/// Merge `entities` into a fresh context and commit it.
fn mirror(
    store: &dyn PersistentStore,
    entities: &[Value],
) -> std::result::Result<(), PersistenceError> {
    let mut context = store.new_context();

    // `{"d": null}` decoded into an `Option` has nothing to store.
    for entity in entities.iter().filter(|entity| !entity.is_null()) {
        if let Err(err) = context.merge(entity) {
            warn!(error = %err, "discarding persistence context");
            return Err(err);
        }
    }

    match context.commit() {
        Ok(count) => {
            debug!(entities = count, "committed decoded entities");
            Ok(())
        }
        Err(err) => {
            warn!(error = %err, "persistence commit failed, decoded entities are not stored");
            Err(err)
        }
    }
}
