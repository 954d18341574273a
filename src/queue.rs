//! Work queue seam.
//!
//! Enqueueing transfers ownership of a [`ReindexWorkItem`] to the queue; the
//! orchestrator never looks at it again. Processing happens out of process.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::OrchestratorError;
use crate::work_item::{QueuedWorkItem, ReindexWorkItem};

#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Enqueue a work item, returning the queue's job id.
    async fn enqueue(&self, item: ReindexWorkItem) -> Result<String, OrchestratorError>;
}

/// FIFO queue held in memory.
#[derive(Default)]
pub struct InMemoryWorkQueue {
    items: Mutex<VecDeque<QueuedWorkItem>>,
}

impl InMemoryWorkQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Take the oldest queued item
    pub fn dequeue(&self) -> Option<QueuedWorkItem> {
        self.items.lock().pop_front()
    }

    /// Copy of everything still queued, oldest first
    #[must_use]
    pub fn snapshot(&self) -> Vec<QueuedWorkItem> {
        self.items.lock().iter().cloned().collect()
    }
}

#[async_trait]
impl WorkQueue for InMemoryWorkQueue {
    async fn enqueue(&self, item: ReindexWorkItem) -> Result<String, OrchestratorError> {
        let queued = QueuedWorkItem::new(item);
        let id = queued.id.to_string();
        debug!(job_id = %id, alias = %queued.item.alias, "Work item enqueued");
        self.items.lock().push_back(queued);
        Ok(id)
    }
}
