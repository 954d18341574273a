// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Distributed lock seam.
//!
//! The orchestrator only needs two things from a lock backend: "is K locked?"
//! and "take K for at most `ttl`, waiting no longer than `max_wait`". Leases
//! expire on their own so a crashed holder can't wedge later attempts.
//!
//! [`InMemoryLockProvider`] covers single-process deployments and tests.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::OrchestratorError;

/// Proof of a held lock, returned to [`LockProvider::release`].
#[derive(Debug, PartialEq, Eq)]
pub struct LockLease {
    key: String,
    token: Uuid,
}

impl LockLease {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: Uuid::new_v4(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn token(&self) -> Uuid {
        self.token
    }
}

#[async_trait]
pub trait LockProvider: Send + Sync {
    async fn is_locked(&self, key: &str) -> Result<bool, OrchestratorError>;

    /// Try to take `key` for `ttl`. Returns `None` if still held by someone
    /// else after `max_wait`.
    async fn try_acquire(
        &self,
        key: &str,
        ttl: Duration,
        max_wait: Duration,
    ) -> Result<Option<LockLease>, OrchestratorError>;

    async fn release(&self, lease: LockLease) -> Result<(), OrchestratorError>;
}

/// Run `action` while holding `key`.
///
/// Returns `Ok(None)` without running the action when the lock couldn't be
/// taken within `max_wait`. The lock is released whatever the action returns;
/// a failed release is logged and left to the TTL.
pub async fn try_using<F, Fut, T>(
    provider: &dyn LockProvider,
    key: &str,
    ttl: Duration,
    max_wait: Duration,
    action: F,
) -> Result<Option<T>, OrchestratorError>
where
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = T> + Send,
{
    let Some(lease) = provider.try_acquire(key, ttl, max_wait).await? else {
        debug!(key = %key, "Lock busy, skipping");
        return Ok(None);
    };

    let output = action().await;

    if let Err(e) = provider.release(lease).await {
        warn!(key = %key, error = %e, "Failed to release lock, leaving it to expire");
    }

    Ok(Some(output))
}

/// Process-local lock provider backed by a concurrent map.
pub struct InMemoryLockProvider {
    locks: DashMap<String, (Uuid, Instant)>,
    poll_interval: Duration,
}

impl InMemoryLockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
            poll_interval: Duration::from_millis(10),
        }
    }

    /// Number of keys currently held (expired leases excluded)
    #[must_use]
    pub fn held_count(&self) -> usize {
        let now = Instant::now();
        self.locks.iter().filter(|e| e.value().1 > now).count()
    }

    fn try_take(&self, key: &str, ttl: Duration) -> Option<LockLease> {
        let now = Instant::now();
        let lease = LockLease::new(key);
        match self.locks.entry(key.to_string()) {
            Entry::Occupied(mut held) => {
                if held.get().1 > now {
                    return None;
                }
                held.insert((lease.token, now + ttl));
            }
            Entry::Vacant(slot) => {
                slot.insert((lease.token, now + ttl));
            }
        }
        Some(lease)
    }
}

impl Default for InMemoryLockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LockProvider for InMemoryLockProvider {
    async fn is_locked(&self, key: &str) -> Result<bool, OrchestratorError> {
        let now = Instant::now();
        Ok(self
            .locks
            .get(key)
            .map(|held| held.value().1 > now)
            .unwrap_or(false))
    }

    async fn try_acquire(
        &self,
        key: &str,
        ttl: Duration,
        max_wait: Duration,
    ) -> Result<Option<LockLease>, OrchestratorError> {
        let deadline = Instant::now() + max_wait;
        loop {
            if let Some(lease) = self.try_take(key, ttl) {
                return Ok(Some(lease));
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    async fn release(&self, lease: LockLease) -> Result<(), OrchestratorError> {
        // Only the holder may release; an expired-and-retaken lease is left alone
        self.locks
            .remove_if(&lease.key, |_, (token, _)| *token == lease.token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_acquire_and_release() {
        let locks = InMemoryLockProvider::new();

        let lease = locks.try_acquire("k", TTL, Duration::ZERO).await.unwrap().unwrap();
        assert_eq!(lease.key(), "k");
        assert!(locks.is_locked("k").await.unwrap());

        locks.release(lease).await.unwrap();
        assert!(!locks.is_locked("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_second_acquire_fails_without_wait() {
        let locks = InMemoryLockProvider::new();
        let _held = locks.try_acquire("k", TTL, Duration::ZERO).await.unwrap().unwrap();

        let second = locks.try_acquire("k", TTL, Duration::ZERO).await.unwrap();
        assert!(second.is_none());
        // Other keys are independent
        assert!(locks.try_acquire("other", TTL, Duration::ZERO).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lease_expires_after_ttl() {
        let locks = InMemoryLockProvider::new();
        let stale = locks
            .try_acquire("k", Duration::from_secs(1), Duration::ZERO)
            .await
            .unwrap()
            .unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!locks.is_locked("k").await.unwrap());

        let fresh = locks.try_acquire("k", TTL, Duration::ZERO).await.unwrap().unwrap();

        // Releasing the stale lease must not drop the fresh holder
        locks.release(stale).await.unwrap();
        assert!(locks.is_locked("k").await.unwrap());
        locks.release(fresh).await.unwrap();
        assert_eq!(locks.held_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_up_to_max_wait() {
        let locks = Arc::new(InMemoryLockProvider::new());
        let held = locks.try_acquire("k", TTL, Duration::ZERO).await.unwrap().unwrap();

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                locks
                    .try_acquire("k", TTL, Duration::from_secs(5))
                    .await
                    .unwrap()
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        locks.release(held).await.unwrap();

        assert!(waiter.await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_try_using_runs_and_releases() {
        let locks = InMemoryLockProvider::new();

        let ran = try_using(&locks, "k", TTL, Duration::ZERO, || async { 42 })
            .await
            .unwrap();
        assert_eq!(ran, Some(42));
        assert!(!locks.is_locked("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_try_using_skips_when_held() {
        let locks = InMemoryLockProvider::new();
        let _held = locks.try_acquire("k", TTL, Duration::ZERO).await.unwrap().unwrap();

        let ran = try_using(&locks, "k", TTL, Duration::ZERO, || async { 42 })
            .await
            .unwrap();
        assert_eq!(ran, None);
    }

    #[tokio::test]
    async fn test_try_using_releases_after_failed_action() {
        let locks = InMemoryLockProvider::new();

        let ran: Option<Result<(), &str>> =
            try_using(&locks, "k", TTL, Duration::ZERO, || async { Err("boom") })
                .await
                .unwrap();
        assert_eq!(ran, Some(Err("boom")));
        assert!(!locks.is_locked("k").await.unwrap());
    }
}
