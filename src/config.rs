//! Configuration for the index orchestrator.
//!
//! # Example
//!
//! ```
//! use search_coordinator::OrchestratorConfig;
//! use std::time::Duration;
//!
//! // Minimal config (uses defaults)
//! let config = OrchestratorConfig::default();
//! assert_eq!(config.enqueue_lock_ttl(), Duration::from_secs(60));
//! assert_eq!(config.migration_lock_prefix, "reindex:");
//!
//! // Override a subset
//! let config = OrchestratorConfig {
//!     enqueue_lock_ttl_secs: 30,
//!     begin_reindexing_outdated: false,
//!     ..Default::default()
//! };
//! ```

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the index orchestrator.
///
/// All fields have sensible defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Prefix of the long-lived migration lock held by the reindex worker
    #[serde(default = "default_migration_lock_prefix")]
    pub migration_lock_prefix: String,

    /// Key of the short-lived lock guarding the check-then-enqueue window
    #[serde(default = "default_enqueue_lock_key")]
    pub enqueue_lock_key: String,

    /// TTL of the enqueue lock so a crashed enqueuer can't wedge later passes
    #[serde(default = "default_enqueue_lock_ttl_secs")]
    pub enqueue_lock_ttl_secs: u64,

    /// How long to wait for the enqueue lock before abandoning the cycle (0 = don't wait)
    #[serde(default)]
    pub enqueue_lock_max_wait_ms: u64,

    /// Default for `configure_indexes` when the caller doesn't say
    #[serde(default = "default_true")]
    pub begin_reindexing_outdated: bool,

    /// Whether enqueued migrations remove the old versioned index when done
    #[serde(default = "default_true")]
    pub delete_old_after_reindex: bool,
}

fn default_migration_lock_prefix() -> String { "reindex:".to_string() }
fn default_enqueue_lock_key() -> String { "enqueue-reindex".to_string() }
fn default_enqueue_lock_ttl_secs() -> u64 { 60 }
fn default_true() -> bool { true }

impl OrchestratorConfig {
    #[must_use]
    pub fn enqueue_lock_ttl(&self) -> Duration {
        Duration::from_secs(self.enqueue_lock_ttl_secs)
    }

    #[must_use]
    pub fn enqueue_lock_max_wait(&self) -> Duration {
        Duration::from_millis(self.enqueue_lock_max_wait_ms)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            migration_lock_prefix: default_migration_lock_prefix(),
            enqueue_lock_key: default_enqueue_lock_key(),
            enqueue_lock_ttl_secs: default_enqueue_lock_ttl_secs(),
            enqueue_lock_max_wait_ms: 0,
            begin_reindexing_outdated: true,
            delete_old_after_reindex: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.enqueue_lock_key, "enqueue-reindex");
        assert_eq!(config.enqueue_lock_max_wait(), Duration::ZERO);
        assert!(config.begin_reindexing_outdated);
        assert!(config.delete_old_after_reindex);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: OrchestratorConfig =
            serde_json::from_str(r#"{"enqueue_lock_ttl_secs": 5}"#).unwrap();
        assert_eq!(config.enqueue_lock_ttl(), Duration::from_secs(5));
        assert_eq!(config.migration_lock_prefix, "reindex:");
        assert!(config.begin_reindexing_outdated);
    }
}
