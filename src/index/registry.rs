//! Index Registry
//!
//! Two-phase registration of the indexes an orchestrator manages.
//!
//! ```text
//! Open ──register()──→ Open ──seal() / indexes()──→ Sealed (immutable IndexSet)
//!                                                        │
//!                                  register() ───────────┴──→ RegistrationFrozen
//! ```
//!
//! Locks, caches and the migration logic downstream assume a fixed index set,
//! so once anything has observed the set it can no longer change.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::{ChildType, Index, IndexCapabilities};
use crate::error::OrchestratorError;

/// An index plus everything resolved about it at registration time.
#[derive(Clone)]
pub struct RegisteredIndex {
    index: Arc<dyn Index>,
    name: String,
    version: u32,
    versioned_name: String,
    capabilities: IndexCapabilities,
    child_types: Arc<[ChildType]>,
}

impl RegisteredIndex {
    pub fn new(index: Arc<dyn Index>) -> Self {
        Self {
            name: index.name().to_string(),
            version: index.version(),
            versioned_name: index.versioned_name(),
            capabilities: index.capabilities(),
            child_types: index.child_types().into(),
            index,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn versioned_name(&self) -> &str {
        &self.versioned_name
    }

    #[must_use]
    pub fn capabilities(&self) -> IndexCapabilities {
        self.capabilities
    }

    #[must_use]
    pub fn child_types(&self) -> &[ChildType] {
        &self.child_types
    }

    /// The underlying index implementation
    #[must_use]
    pub fn index(&self) -> &Arc<dyn Index> {
        &self.index
    }
}

impl From<Arc<dyn Index>> for RegisteredIndex {
    fn from(index: Arc<dyn Index>) -> Self {
        Self::new(index)
    }
}

impl fmt::Debug for RegisteredIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredIndex")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Immutable, cheaply cloneable set of registered indexes.
#[derive(Clone, Debug)]
pub struct IndexSet {
    indexes: Arc<[RegisteredIndex]>,
}

impl Default for IndexSet {
    fn default() -> Self {
        Self::from(Vec::new())
    }
}

impl IndexSet {
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredIndex> {
        self.indexes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Get a registered index by logical name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RegisteredIndex> {
        self.indexes.iter().find(|idx| idx.name == name)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[RegisteredIndex] {
        &self.indexes
    }
}

impl From<Vec<RegisteredIndex>> for IndexSet {
    fn from(indexes: Vec<RegisteredIndex>) -> Self {
        Self {
            indexes: indexes.into(),
        }
    }
}

impl<'a> IntoIterator for &'a IndexSet {
    type Item = &'a RegisteredIndex;
    type IntoIter = std::slice::Iter<'a, RegisteredIndex>;

    fn into_iter(self) -> Self::IntoIter {
        self.indexes.iter()
    }
}

enum RegistryState {
    Open(Vec<RegisteredIndex>),
    Sealed(IndexSet),
}

/// Registry of indexes, open for registration until sealed.
pub struct IndexRegistry {
    state: RwLock<RegistryState>,
}

impl IndexRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::Open(Vec::new())),
        }
    }

    /// Register an index.
    ///
    /// Registering a name twice replaces the earlier definition in place.
    /// Fails once the registry has been sealed.
    pub fn register(&self, index: Arc<dyn Index>) -> Result<(), OrchestratorError> {
        let mut state = self.state.write();
        match &mut *state {
            RegistryState::Sealed(_) => {
                Err(OrchestratorError::RegistrationFrozen(index.name().to_string()))
            }
            RegistryState::Open(pending) => {
                let registered = RegisteredIndex::new(index);
                debug!(
                    index = %registered.name,
                    version = registered.version,
                    capabilities = ?registered.capabilities,
                    "Index registered"
                );
                match pending.iter_mut().find(|idx| idx.name == registered.name) {
                    Some(existing) => *existing = registered,
                    None => pending.push(registered),
                }
                Ok(())
            }
        }
    }

    /// Freeze the registry and return the final index set.
    ///
    /// Idempotent: later calls return the same set.
    pub fn seal(&self) -> IndexSet {
        if let RegistryState::Sealed(set) = &*self.state.read() {
            return set.clone();
        }

        let mut state = self.state.write();
        let set = match &mut *state {
            RegistryState::Sealed(set) => return set.clone(),
            RegistryState::Open(pending) => IndexSet::from(std::mem::take(pending)),
        };
        debug!(count = set.len(), "Index registry sealed");
        *state = RegistryState::Sealed(set.clone());
        set
    }

    /// Read the registered index set. Reading seals the registry.
    pub fn indexes(&self) -> IndexSet {
        self.seal()
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        matches!(&*self.state.read(), RegistryState::Sealed(_))
    }
}

impl Default for IndexRegistry {
    fn default() -> Self {
        Self::new()
    }
}
