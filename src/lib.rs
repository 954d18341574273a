//! # Search Coordinator
//!
//! Coordination layer between application code and a distributed search engine:
//! lifecycle management for versioned indexes behind stable aliases, and
//! composition of engine-neutral queries into the engine's query DSL.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Index Orchestrator                       │
//! │  • Registry of versioned indexes (sealed on first read)    │
//! │  • configure / maintain / delete / reindex fan-out         │
//! │  • Migration detection per index                           │
//! └─────────────────────────────────────────────────────────────┘
//!            │                    │                    │
//!            ▼                    ▼                    ▼
//!     ┌────────────┐       ┌────────────┐       ┌────────────┐
//!     │SearchClient│       │LockProvider│       │ WorkQueue  │
//!     │ alias→index│       │ dedupe     │       │ reindex    │
//!     │ versions   │       │ enqueue    │       │ jobs       │
//!     └────────────┘       └────────────┘       └────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Query Composition                        │
//! │  • One QueryBuilderContext per search request              │
//! │  • Visitors append to Query (scored) / Filter (unscored)   │
//! │  • Date window and alias resolution done once              │
//! │  • bool { must: [query], filter: [filter] }                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use search_coordinator::{
//!     IndexOrchestrator, InMemoryLockProvider, InMemorySearchClient, InMemoryWorkQueue,
//! };
//! use search_coordinator::query::{
//!     configure_search, ChainedQueryBuilder, QueryOptions, RepositoryQuery,
//!     SearchTextQueryBuilder,
//! };
//! use search_coordinator::client::SearchRequest;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Arc::new(InMemorySearchClient::new());
//!     let orchestrator = IndexOrchestrator::new(client)
//!         .with_lock_provider(Arc::new(InMemoryLockProvider::new()))
//!         .with_work_queue(Arc::new(InMemoryWorkQueue::new()));
//!
//!     // Register indexes, then configure them (enqueues any needed migrations)
//!     // orchestrator.add_index(Arc::new(OrdersIndex::new()))?;
//!     orchestrator.configure().await.expect("configure failed");
//!
//!     // Compile a query onto a search request
//!     let builder = ChainedQueryBuilder::<serde_json::Value>::new()
//!         .with(SearchTextQueryBuilder, 0);
//!     let source = RepositoryQuery::new().with_filter("status:active");
//!     let mut search = SearchRequest::<serde_json::Value>::new();
//!     configure_search(&builder, &source, &QueryOptions::new(), Some(&mut search))
//!         .await
//!         .expect("query failed");
//! }
//! ```
//!
//! ## Configuration
//!
//! See [`OrchestratorConfig`] for lock keys, TTLs and migration policy.
//!
//! ## Modules
//!
//! - [`orchestrator`]: The [`IndexOrchestrator`] and its lifecycle operations
//! - [`index`]: The [`Index`] capability, naming rules and the sealed registry
//! - [`query`]: Query AST, builder context, visitors and composition helpers
//! - [`client`]: Search engine client seam and request/response types
//! - [`lock`]: Lock provider seam and `try_using`
//! - [`queue`]: Work queue seam
//! - [`work_item`]: Reindex work items handed to the queue

pub mod client;
pub mod config;
pub mod error;
pub mod index;
pub mod lock;
pub mod metrics;
pub mod orchestrator;
pub mod query;
pub mod queue;
pub mod work_item;

pub use client::{InMemorySearchClient, SearchClient, SearchRequest, SearchResponse};
pub use config::OrchestratorConfig;
pub use error::{BatchError, IndexFailure, OrchestratorError, QueryError};
pub use index::{ChildType, Index, IndexCapabilities, IndexSet, ProgressFn, RegisteredIndex};
pub use lock::{try_using, InMemoryLockProvider, LockLease, LockProvider};
pub use orchestrator::{ConfigureReport, IndexOrchestrator, MigrationOutcome};
pub use query::{build_query, configure_search, QueryBuilder, QueryBuilderContext};
pub use queue::{InMemoryWorkQueue, WorkQueue};
pub use work_item::{ParentMap, QueuedWorkItem, ReindexWorkItem};
