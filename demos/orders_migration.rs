// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Orders index migration walkthrough.
//!
//! Demonstrates:
//! 1. Registering a versioned index whose alias still points at v1
//! 2. Configuring: v2 is created and a reindex job is enqueued
//! 3. Playing the out-of-process worker: migration lock, alias swap, old index drop
//! 4. Configuring again: steady state, nothing enqueued
//! 5. Compiling a query and running it against the alias
//! 6. Displaying the recorded metrics
//!
//! # Run
//!
//! ```bash
//! cargo run --example orders_migration
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde::Deserialize;
use serde_json::json;

use search_coordinator::client::{search, SearchHit, SearchRequest};
use search_coordinator::query::{
    configure_search, AliasMap, ChainedQueryBuilder, DateRangeQueryBuilder, QueryOptions,
    RepositoryQuery, SearchTextQueryBuilder,
};
use search_coordinator::{
    ChildType, InMemoryLockProvider, InMemorySearchClient, InMemoryWorkQueue, Index,
    IndexOrchestrator, LockProvider, OrchestratorError, SearchClient,
};

struct OrdersIndex {
    client: Arc<InMemorySearchClient>,
}

#[async_trait]
impl Index for OrdersIndex {
    fn name(&self) -> &str {
        "orders"
    }

    fn version(&self) -> u32 {
        2
    }

    fn child_types(&self) -> Vec<ChildType> {
        vec![ChildType::new("line", "order_id")]
    }

    async fn configure(&self) -> Result<(), OrchestratorError> {
        let concrete = self.versioned_name();
        if !self.client.index_exists(&concrete).await? {
            self.client
                .create_index(&concrete, json!({"mappings": {"properties": {"status": {"type": "keyword"}}}}))
                .await?;
        }
        if self.client.indices_behind_alias(self.name()).await?.is_empty() {
            self.client.put_alias(self.name(), &concrete).await?;
        }
        Ok(())
    }

    async fn delete(&self) -> Result<(), OrchestratorError> {
        self.client.delete_index(&self.versioned_name()).await
    }
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Order {
    id: String,
    status: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info,search_coordinator=debug"))
        .with_target(false)
        .compact()
        .init();

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Orchestrator over an alias still pointing at v1
    // ─────────────────────────────────────────────────────────────────────────
    let client = Arc::new(InMemorySearchClient::new().with_alias("orders", "orders-v1"));
    let locks = Arc::new(InMemoryLockProvider::new());
    let queue = Arc::new(InMemoryWorkQueue::new());

    let orchestrator = IndexOrchestrator::new(client.clone())
        .with_lock_provider(locks.clone())
        .with_work_queue(queue.clone());
    orchestrator.add_index(Arc::new(OrdersIndex { client: client.clone() }))?;

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Configure: creates orders-v2 and enqueues the migration
    // ─────────────────────────────────────────────────────────────────────────
    let report = orchestrator.configure().await?;
    println!("configure #1: {:?}", report.outcome("orders"));

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Worker: take the migration lock, swap the alias, drop the old index
    // ─────────────────────────────────────────────────────────────────────────
    if let Some(job) = queue.dequeue() {
        let key = job.item.migration_lock_key(&orchestrator.config().migration_lock_prefix);
        let lease = locks
            .try_acquire(&key, Duration::from_secs(300), Duration::ZERO)
            .await?
            .ok_or("migration already running")?;

        println!("worker: {} -> {} (job {})", job.item.old_index, job.item.new_index, job.id);
        client.put_alias(&job.item.alias, &job.item.new_index).await?;
        client.remove_alias(&job.item.alias, &job.item.old_index).await?;
        if job.item.delete_old {
            client.delete_index(&job.item.old_index).await?;
        }
        locks.release(lease).await?;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Steady state
    // ─────────────────────────────────────────────────────────────────────────
    let report = orchestrator.configure().await?;
    println!("configure #2: {:?}", report.outcome("orders"));
    println!("indexes: {:?}", client.index_names());

    // ─────────────────────────────────────────────────────────────────────────
    // 5. Query through the alias
    // ─────────────────────────────────────────────────────────────────────────
    client.add_hit(SearchHit::new("o-1", "orders-v2", json!({"id": "o-1", "status": "open"})));

    let builder = ChainedQueryBuilder::<Order>::new()
        .with(DateRangeQueryBuilder, 0)
        .with(SearchTextQueryBuilder, 10);
    let options = QueryOptions::new().with_alias_resolver(AliasMap::new().with("state", "status"));
    let source = RepositoryQuery::new().with_filter("state:open");

    let mut request = SearchRequest::<Order>::new().with_page(0, 20);
    configure_search(&builder, &source, &options, Some(&mut request)).await?;
    println!("body: {}", request.to_body());

    let orders = search(client.as_ref(), "orders", &request).await?;
    println!("orders: {:?}", orders);

    // ─────────────────────────────────────────────────────────────────────────
    // 6. Metrics
    // ─────────────────────────────────────────────────────────────────────────
    for (composite_key, _, _, value) in snapshotter.snapshot().into_vec() {
        let (_, key) = composite_key.into_parts();
        let labels: Vec<_> = key.labels().map(|l| format!("{}={}", l.key(), l.value())).collect();
        let value = match value {
            DebugValue::Counter(v) => v.to_string(),
            DebugValue::Gauge(v) => format!("{:.2}", v.into_inner()),
            DebugValue::Histogram(samples) => format!("{} samples", samples.len()),
        };
        println!("{}{{{}}} = {}", key.name(), labels.join(","), value);
    }

    orchestrator.dispose();
    Ok(())
}
