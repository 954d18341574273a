// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Versioned Indexes
//!
//! An [`Index`] is one logical search index: a stable name (the alias callers
//! query), a schema version, and the index-specific schema logic that
//! configures, maintains, deletes and reindexes it.
//!
//! # Naming
//!
//! ```text
//! alias: orders ──→ orders-v2   (steady state)
//!
//! alias: orders ──→ orders-v1   (during migration, transiently both)
//!               └─→ orders-v2
//! ```
//!
//! # Capabilities
//!
//! Every index can be configured and deleted. Maintenance and direct reindexing
//! are optional and declared through [`Index::capabilities`], which the
//! [`IndexRegistry`] reads once at registration time.

mod naming;
mod registry;

pub use naming::{highest_version, parse_version, versioned_name, VERSION_SEPARATOR};
pub use registry::{IndexRegistry, IndexSet, RegisteredIndex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// Progress callback for caller-blocking reindexing: `(percent_complete, message)`.
pub type ProgressFn<'a> = dyn Fn(u32, &str) + Send + Sync + 'a;

/// Optional operations an index supports beyond configure/delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexCapabilities {
    /// Has periodic maintenance (e.g. rolling time-series indexes)
    pub maintainable: bool,
    /// Can be reindexed in-process via [`Index::reindex`]
    pub reindexable: bool,
}

impl IndexCapabilities {
    #[must_use]
    pub fn maintainable(mut self) -> Self {
        self.maintainable = true;
        self
    }

    #[must_use]
    pub fn reindexable(mut self) -> Self {
        self.reindexable = true;
        self
    }
}

/// A child document type joined to a parent through `parent_path`.
///
/// The reindex worker needs these to re-route child documents to their parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildType {
    pub name: String,
    pub parent_path: String,
}

impl ChildType {
    pub fn new(name: impl Into<String>, parent_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_path: parent_path.into(),
        }
    }
}

/// One logical, versioned search index.
///
/// Implementations own their engine client and schema; the orchestrator only
/// sequences the calls.
#[async_trait]
pub trait Index: Send + Sync {
    /// Stable logical name, also the alias name
    fn name(&self) -> &str;

    /// Target schema version (positive, increases with every schema change)
    fn version(&self) -> u32;

    /// Concrete index name for the target version
    fn versioned_name(&self) -> String {
        versioned_name(self.name(), self.version())
    }

    fn capabilities(&self) -> IndexCapabilities {
        IndexCapabilities::default()
    }

    /// Parent/child relationships the reindex worker must preserve
    fn child_types(&self) -> Vec<ChildType> {
        Vec::new()
    }

    /// Idempotent mapping/alias setup for the target version.
    async fn configure(&self) -> Result<(), OrchestratorError>;

    async fn delete(&self) -> Result<(), OrchestratorError>;

    /// Only called when [`IndexCapabilities::maintainable`] is set.
    async fn maintain(&self) -> Result<(), OrchestratorError> {
        Ok(())
    }

    /// Only called when [`IndexCapabilities::reindexable`] is set.
    async fn reindex(&self, _progress: Option<&ProgressFn<'_>>) -> Result<(), OrchestratorError> {
        Ok(())
    }

    /// Release any resources held by the index.
    fn dispose(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    #[async_trait]
    impl Index for Plain {
        fn name(&self) -> &str {
            "orders"
        }
        fn version(&self) -> u32 {
            2
        }
        async fn configure(&self) -> Result<(), OrchestratorError> {
            Ok(())
        }
        async fn delete(&self) -> Result<(), OrchestratorError> {
            Ok(())
        }
    }

    #[test]
    fn test_default_versioned_name() {
        assert_eq!(Plain.versioned_name(), "orders-v2");
    }

    #[test]
    fn test_default_capabilities_are_empty() {
        let caps = Plain.capabilities();
        assert!(!caps.maintainable);
        assert!(!caps.reindexable);
        assert!(Plain.child_types().is_empty());
    }

    #[test]
    fn test_capability_builder() {
        let caps = IndexCapabilities::default().maintainable().reindexable();
        assert!(caps.maintainable);
        assert!(caps.reindexable);
    }
}
