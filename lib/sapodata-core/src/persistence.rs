//! Optional mirroring of decoded entities into a local store.
//!
//! A [`PersistentStore`] hands out one fresh [`PersistenceContext`] per
//! decode. Entities are merged into the context, then the context is
//! committed exactly once. Dropping a context without committing discards
//! everything merged into it.
//!
//! [`MemoryStore`] is the bundled in-process implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use derive_more::{Display, Error};
use serde_json::{Map, Value};

// ============================================================================
// Errors
// ============================================================================

/// Failure to merge into or commit a persistence context.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum PersistenceError {
    /// The entity carries neither `__metadata` nor the configured key properties.
    #[display("cannot resolve the identity of entity: {_0}")]
    MissingIdentity(#[error(not(source))] String),

    /// Only JSON objects can be stored.
    #[display("entity is not a JSON object")]
    NotAnObject,

    /// The store rejected the commit.
    #[display("commit failed: {_0}")]
    Commit(#[error(not(source))] String),
}

// ============================================================================
// Store / Context traits
// ============================================================================

/// A store that can open transactional contexts.
pub trait PersistentStore: Send + Sync {
    /// Open a context scoped to a single decode operation.
    fn new_context(&self) -> Box<dyn PersistenceContext>;
}

/// A unit of work: merge entities, then commit once.
pub trait PersistenceContext: Send {
    /// Stage one decoded entity (its raw JSON form).
    ///
    /// # Errors
    ///
    /// Returns an error when the entity cannot be stored (e.g. no identity).
    fn merge(&mut self, entity: &Value) -> Result<(), PersistenceError>;

    /// Apply every staged entity, returning how many were written.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Commit`] when the store rejects the work;
    /// nothing staged in this context is kept in that case.
    fn commit(self: Box<Self>) -> Result<usize, PersistenceError>;
}

impl<S: PersistentStore + ?Sized> PersistentStore for Arc<S> {
    fn new_context(&self) -> Box<dyn PersistenceContext> {
        (**self).new_context()
    }
}

// ============================================================================
// Merge policy and identity
// ============================================================================

/// How a staged entity is combined with an already stored one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MergePolicy {
    /// Property by property, the newly decoded value wins.
    #[default]
    PropertyNewestWins,
    /// Property by property, the stored value wins; only new properties are added.
    PropertyStoreWins,
}

impl MergePolicy {
    /// Merge `incoming` properties into `stored`.
    pub fn apply(self, stored: &mut Map<String, Value>, incoming: Map<String, Value>) {
        match self {
            Self::PropertyNewestWins => stored.extend(incoming),
            Self::PropertyStoreWins => {
                for (name, value) in incoming {
                    stored.entry(name).or_insert(value);
                }
            }
        }
    }
}

/// Identity of a stored entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub struct EntityKey(String);

impl EntityKey {
    /// Build a key from any string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve the identity of a decoded entity.
    ///
    /// OData v2 entities carry `__metadata.uri` (or `__metadata.id`); that is
    /// used first. Otherwise the `key_properties` are read, prefixed with
    /// `__metadata.type` when present, e.g. `ZSRV.Product(id="42")`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::MissingIdentity`] when nothing identifies
    /// the entity.
    pub fn resolve(
        entity: &Map<String, Value>,
        key_properties: &[String],
    ) -> Result<Self, PersistenceError> {
        let metadata = entity.get("__metadata").and_then(Value::as_object);

        if let Some(uri) = metadata
            .and_then(|meta| meta.get("uri").or_else(|| meta.get("id")))
            .and_then(Value::as_str)
        {
            return Ok(Self::new(uri));
        }

        if key_properties.is_empty() {
            return Err(PersistenceError::MissingIdentity(
                "no __metadata and no key properties configured".to_string(),
            ));
        }

        let mut parts = Vec::with_capacity(key_properties.len());
        for name in key_properties {
            let value = entity
                .get(name)
                .filter(|value| !value.is_null())
                .ok_or_else(|| {
                    PersistenceError::MissingIdentity(format!("missing key property `{name}`"))
                })?;
            parts.push(format!("{name}={value}"));
        }

        let entity_type = metadata
            .and_then(|meta| meta.get("type"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        Ok(Self(format!("{entity_type}({})", parts.join(","))))
    }
}

// ============================================================================
// In-memory store
// ============================================================================

type Records = HashMap<EntityKey, Map<String, Value>>;

/// In-process [`PersistentStore`].
///
/// Cloning is cheap and clones share the same records.
///
/// # Example
///
/// ```
/// use sapodata_core::{MemoryStore, MergePolicy};
///
/// let store = MemoryStore::new()
///     .with_key_properties(["ProductID"])
///     .with_merge_policy(MergePolicy::PropertyNewestWins);
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Records>>,
    key_properties: Arc<[String]>,
    policy: MergePolicy,
}

impl MemoryStore {
    /// Create an empty store identifying entities by `__metadata` only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Identify entities without `__metadata` by these properties.
    #[must_use]
    pub fn with_key_properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_properties = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the merge policy.
    #[must_use]
    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The merge policy in use.
    #[must_use]
    pub const fn merge_policy(&self) -> MergePolicy {
        self.policy
    }

    /// A stored entity by key.
    #[must_use]
    pub fn get(&self, key: &EntityKey) -> Option<Value> {
        self.read().get(key).cloned().map(Value::Object)
    }

    /// Number of stored entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store holds no entity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Every stored entity, sorted by key.
    #[must_use]
    pub fn entities(&self) -> Vec<(EntityKey, Value)> {
        let mut entities: Vec<_> = self
            .read()
            .iter()
            .map(|(key, record)| (key.clone(), Value::Object(record.clone())))
            .collect();
        entities.sort_by(|(a, _), (b, _)| a.cmp(b));
        entities
    }

    /// Remove every stored entity.
    pub fn clear(&self) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Records> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PersistentStore for MemoryStore {
    fn new_context(&self) -> Box<dyn PersistenceContext> {
        Box::new(MemoryContext {
            store: self.clone(),
            staged: Vec::new(),
        })
    }
}

/// Context of a [`MemoryStore`]; staged entities are applied under one write lock.
#[derive(Debug)]
struct MemoryContext {
    store: MemoryStore,
    staged: Vec<(EntityKey, Map<String, Value>)>,
}

impl PersistenceContext for MemoryContext {
    fn merge(&mut self, entity: &Value) -> Result<(), PersistenceError> {
        let Value::Object(properties) = entity else {
            return Err(PersistenceError::NotAnObject);
        };
        let key = EntityKey::resolve(properties, &self.store.key_properties)?;
        self.staged.push((key, properties.clone()));
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<usize, PersistenceError> {
        let Self { store, staged } = *self;
        let count = staged.len();

        let mut records = store
            .records
            .write()
            .map_err(|_| PersistenceError::Commit("store lock poisoned".to_string()))?;

        for (key, incoming) in staged {
            match records.get_mut(&key) {
                Some(stored) => store.policy.apply(stored, incoming),
                None => {
                    records.insert(key, incoming);
                }
            }
        }

        Ok(count)
    }
}
