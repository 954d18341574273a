// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query compilation
//!
//! Turns an engine-neutral [`SourceQuery`] into an engine query by running a
//! chain of [`QueryBuilder`] visitors over a per-request
//! [`QueryBuilderContext`].
//!
//! # Example
//!
//! ```rust,no_run
//! use search_coordinator::query::{
//!     build_query, ChainedQueryBuilder, DateRangeQueryBuilder, QueryOptions,
//!     RepositoryQuery, SearchTextQueryBuilder,
//! };
//! use search_coordinator::client::SearchRequest;
//!
//! # async fn example() -> Result<(), search_coordinator::QueryError> {
//! let builder = ChainedQueryBuilder::<serde_json::Value>::new()
//!     .with(DateRangeQueryBuilder, 0)
//!     .with(SearchTextQueryBuilder, 10);
//!
//! let source = RepositoryQuery::new().with_filter("status:active");
//! let query = build_query(&builder, &source, &QueryOptions::new(), None::<&mut SearchRequest<_>>).await?;
//! # Ok(())
//! # }
//! ```

mod ast;
mod builder;
mod compose;
mod context;
mod data;
mod dsl;
mod options;
mod source;
mod visitors;

pub use ast::{
    BoolQuery, FieldOperator, FieldQuery, Operator, Query, QueryNode,
    QueryStringQuery, QueryValue,
};
pub use builder::{ChainedQueryBuilder, QueryBuilder};
pub use compose::{build_query, configure_search};
pub use context::{QueryBuilderContext, ResolvedDateRange};
pub use data::{ContextData, END_DATE, START_DATE};
pub use dsl::DslTranslator;
pub use options::{AliasMap, AliasResolver, IncludeMap, IncludeResolver, QueryOptions};
pub use source::{earliest_date, DateRange, RepositoryQuery, SourceQuery};
pub use visitors::{DateRangeQueryBuilder, SearchTextQueryBuilder, INCLUDE_PREFIX};
