//! Migration detection: decide whether an index's alias lags its target
//! version and, if so, enqueue exactly one reindex job for it.

use tracing::{debug, info};

use super::{IndexOrchestrator, MigrationOutcome};
use crate::error::OrchestratorError;
use crate::index::{versioned_name, RegisteredIndex};
use crate::lock::{try_using, LockProvider};
use crate::queue::WorkQueue;
use crate::work_item::ReindexWorkItem;

/// Collaborators required for migration detection.
pub(super) struct Migration<'a> {
    pub lock: &'a dyn LockProvider,
    pub queue: &'a dyn WorkQueue,
}

impl IndexOrchestrator {
    /// Both collaborators, or a configuration error naming what's missing.
    pub(super) fn migration(&self) -> Result<Migration<'_>, OrchestratorError> {
        let queue = self.work_queue.as_deref().ok_or_else(|| {
            OrchestratorError::Configuration(
                "reindexing outdated indexes requires a work queue".to_string(),
            )
        })?;
        let lock = self.lock_provider.as_deref().ok_or_else(|| {
            OrchestratorError::Configuration(
                "reindexing outdated indexes requires a lock provider".to_string(),
            )
        })?;
        Ok(Migration { lock, queue })
    }

    pub(super) async fn detect_migration(
        &self,
        index: &RegisteredIndex,
        migration: &Migration<'_>,
    ) -> Result<MigrationOutcome, OrchestratorError> {
        let alias = index.name();
        let target = index.version();

        let current = match self.client.current_version_behind_alias(alias).await? {
            Some(version) if version >= 1 => version,
            _ => {
                debug!(alias = %alias, "No versioned index behind alias");
                return Ok(MigrationOutcome::NoPreviousVersion);
            }
        };

        if current >= target {
            debug!(alias = %alias, current, target, "Index up to date");
            return Ok(MigrationOutcome::UpToDate { current });
        }

        let item = ReindexWorkItem::new(versioned_name(alias, current), index.versioned_name(), alias)?
            .with_delete_old(self.config.delete_old_after_reindex)
            .with_parent_maps(index.child_types());

        let migration_key = item.migration_lock_key(&self.config.migration_lock_prefix);
        if migration.lock.is_locked(&migration_key).await? {
            debug!(key = %migration_key, "Migration already in progress");
            return Ok(MigrationOutcome::AlreadyMigrating);
        }

        let old_index = item.old_index.clone();
        let new_index = item.new_index.clone();
        let queue = migration.queue;

        let enqueued = try_using(
            migration.lock,
            &self.config.enqueue_lock_key,
            self.config.enqueue_lock_ttl(),
            self.config.enqueue_lock_max_wait(),
            move || queue.enqueue(item),
        )
        .await?;

        match enqueued {
            None => {
                debug!(alias = %alias, "Enqueue lock busy, leaving migration for the next pass");
                Ok(MigrationOutcome::EnqueueContended)
            }
            Some(result) => {
                let job_id = result?;
                info!(
                    alias = %alias,
                    old_index = %old_index,
                    new_index = %new_index,
                    job_id = %job_id,
                    "Reindex enqueued"
                );
                Ok(MigrationOutcome::Enqueued {
                    job_id,
                    old_index,
                    new_index,
                })
            }
        }
    }
}
