//! Result types reported by the orchestrator.

/// What migration detection decided for one index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Detection was turned off for this call
    Disabled,
    /// No versioned index behind the alias yet (fresh install)
    NoPreviousVersion,
    /// Alias already points at the target version or newer
    UpToDate { current: u32 },
    /// A worker holds the migration lock for this tuple
    AlreadyMigrating,
    /// Another caller held the enqueue lock; retried on the next configure
    EnqueueContended,
    Enqueued {
        job_id: String,
        old_index: String,
        new_index: String,
    },
}

impl MigrationOutcome {
    /// Metric label
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::NoPreviousVersion => "no_previous_version",
            Self::UpToDate { .. } => "up_to_date",
            Self::AlreadyMigrating => "already_migrating",
            Self::EnqueueContended => "enqueue_contended",
            Self::Enqueued { .. } => "enqueued",
        }
    }

    #[must_use]
    pub fn is_enqueued(&self) -> bool {
        matches!(self, Self::Enqueued { .. })
    }
}

/// Per-index outcome of a configure pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOutcome {
    pub index: String,
    pub migration: MigrationOutcome,
}

/// Report of a successful configure pass, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigureReport {
    pub outcomes: Vec<IndexOutcome>,
}

impl ConfigureReport {
    /// Migration outcome for `index`, if it was part of the pass
    #[must_use]
    pub fn outcome(&self, index: &str) -> Option<&MigrationOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.index == index)
            .map(|o| &o.migration)
    }

    /// Number of work items enqueued during the pass
    #[must_use]
    pub fn enqueued_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.migration.is_enqueued()).count()
    }
}
