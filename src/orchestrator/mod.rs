// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Index lifecycle orchestrator.
//!
//! The [`IndexOrchestrator`] owns the registered indexes and fans lifecycle
//! operations out over them. During configure it also decides, per index,
//! whether the alias still points at an older schema version and, if so,
//! hands a [`ReindexWorkItem`] to the work queue.
//!
//! # Migration detection
//!
//! ```text
//! current = highest version behind alias
//!     │
//!     ├─ none / < 1 ─────────────→ NoPreviousVersion
//!     ├─ ≥ target ───────────────→ UpToDate
//!     └─ < target
//!          │
//!          ├─ reindex:{alias}{old}{new} locked ─→ AlreadyMigrating
//!          └─ take "enqueue-reindex" (no wait)
//!               ├─ busy ──→ EnqueueContended
//!               └─ held ──→ enqueue, release ─→ Enqueued
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use search_coordinator::{
//!     IndexOrchestrator, InMemoryLockProvider, InMemorySearchClient, InMemoryWorkQueue,
//! };
//!
//! # async fn example() -> Result<(), search_coordinator::OrchestratorError> {
//! let orchestrator = IndexOrchestrator::new(Arc::new(InMemorySearchClient::new()))
//!     .with_lock_provider(Arc::new(InMemoryLockProvider::new()))
//!     .with_work_queue(Arc::new(InMemoryWorkQueue::new()));
//!
//! // orchestrator.add_index(Arc::new(OrdersIndex::new(...)))?;
//! let report = orchestrator.configure().await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`ReindexWorkItem`]: crate::work_item::ReindexWorkItem

mod lifecycle;
mod migration;
mod types;

pub use types::{ConfigureReport, IndexOutcome, MigrationOutcome};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::client::SearchClient;
use crate::config::OrchestratorConfig;
use crate::error::OrchestratorError;
use crate::index::{Index, IndexRegistry, IndexSet, RegisteredIndex};
use crate::lock::LockProvider;
use crate::queue::WorkQueue;

/// Coordinates configure, maintain, delete and reindex across versioned indexes.
pub struct IndexOrchestrator {
    client: Arc<dyn SearchClient>,
    registry: IndexRegistry,
    lock_provider: Option<Arc<dyn LockProvider>>,
    work_queue: Option<Arc<dyn WorkQueue>>,
    config: OrchestratorConfig,
    disposed: AtomicBool,
}

impl IndexOrchestrator {
    /// Create an orchestrator with the default configuration.
    ///
    /// Without a lock provider and work queue, configure only works with
    /// migration detection turned off.
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        Self {
            client,
            registry: IndexRegistry::new(),
            lock_provider: None,
            work_queue: None,
            config: OrchestratorConfig::default(),
            disposed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_lock_provider(mut self, provider: Arc<dyn LockProvider>) -> Self {
        self.lock_provider = Some(provider);
        self
    }

    #[must_use]
    pub fn with_work_queue(mut self, queue: Arc<dyn WorkQueue>) -> Self {
        self.work_queue = Some(queue);
        self
    }

    /// Register an index. Fails once the index set has been read or sealed.
    pub fn add_index(&self, index: Arc<dyn Index>) -> Result<(), OrchestratorError> {
        self.registry.register(index)
    }

    /// Freeze registration and return the final index set.
    pub fn seal(&self) -> IndexSet {
        self.registry.seal()
    }

    /// The registered indexes. Reading seals registration.
    pub fn indexes(&self) -> IndexSet {
        self.registry.indexes()
    }

    /// Look up a registered index by logical name. Seals registration.
    pub fn index(&self, name: &str) -> Option<RegisteredIndex> {
        self.registry.indexes().get(name).cloned()
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.registry.is_sealed()
    }

    pub fn client(&self) -> &Arc<dyn SearchClient> {
        &self.client
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Dispose every registered index. Later calls do nothing.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        let indexes = self.registry.indexes();
        for index in &indexes {
            debug!(index = %index.name(), "Disposing index");
            index.index().dispose();
        }
        crate::metrics::record_index_operation("dispose", true);
        info!(count = indexes.len(), "Index orchestrator disposed");
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Explicit subset, or every registered index
    fn targets(&self, indexes: Option<&[RegisteredIndex]>) -> IndexSet {
        match indexes {
            Some(subset) => IndexSet::from(subset.to_vec()),
            None => self.registry.indexes(),
        }
    }
}

impl Drop for IndexOrchestrator {
    fn drop(&mut self) {
        self.dispose();
    }
}
