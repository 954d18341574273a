//! Integration tests for query compilation.
//!
//! Drives `build_query` / `configure_search` end to end with stock and
//! custom builders, then checks the rendered engine body.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;

use search_coordinator::client::{search, SearchHit, SearchRequest};
use search_coordinator::query::{
    build_query, configure_search, AliasMap, ChainedQueryBuilder, DateRange,
    DateRangeQueryBuilder, IncludeMap, Query, QueryBuilder, QueryBuilderContext, QueryOptions,
    RepositoryQuery, SearchTextQueryBuilder, SourceQuery, END_DATE, START_DATE,
};
use search_coordinator::{InMemorySearchClient, QueryError};

#[derive(Debug, Deserialize, PartialEq)]
struct Order {
    id: String,
    status: String,
}

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn stock_builder() -> ChainedQueryBuilder<Order> {
    ChainedQueryBuilder::new()
        .with(DateRangeQueryBuilder, 0)
        .with(SearchTextQueryBuilder, 10)
}

/// Records the date window it saw, to check what visitors observe.
struct WindowProbe;

#[async_trait]
impl QueryBuilder<Order> for WindowProbe {
    async fn build(&self, ctx: &mut QueryBuilderContext<'_, Order>) -> Result<(), QueryError> {
        let start = ctx.data().get(START_DATE).cloned();
        let end = ctx.data().get(END_DATE).cloned();
        ctx.data_mut().insert("probe.start", start.unwrap_or_default());
        ctx.data_mut().insert("probe.end", end.unwrap_or_default());
        Ok(())
    }
}

/// Custom source type unknown to the stock builders.
struct TenantQuery {
    tenant: String,
}

impl SourceQuery for TenantQuery {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

struct TenantBuilder;

#[async_trait]
impl QueryBuilder<Order> for TenantBuilder {
    async fn build(&self, ctx: &mut QueryBuilderContext<'_, Order>) -> Result<(), QueryError> {
        let Some(source) = ctx.source_as::<TenantQuery>() else {
            return Ok(());
        };
        if source.tenant.is_empty() {
            return Err(QueryError::builder("tenant must not be empty"));
        }
        let field = ctx.resolve_field("tenant");
        ctx.add_filter(Query::field_eq(field, source.tenant.clone()));
        Ok(())
    }
}

#[tokio::test]
async fn empty_builder_composes_to_match_all() {
    let builder = ChainedQueryBuilder::<Order>::new();
    let mut search = SearchRequest::<Order>::new();

    configure_search(&builder, &RepositoryQuery::new(), &QueryOptions::new(), Some(&mut search))
        .await
        .unwrap();

    assert!(search.query().unwrap().is_match_all());
    assert_eq!(
        search.to_body(),
        json!({"query": {"bool": {
            "must": [{"match_all": {}}],
            "filter": [{"match_all": {}}]
        }}})
    );
}

#[tokio::test]
async fn source_date_range_wins_over_system_filter() {
    let source = RepositoryQuery::new()
        .with_date_range(DateRange::new("created", Some(day(2024, 1, 1)), Some(day(2024, 1, 31))))
        .with_system_filter(
            RepositoryQuery::new()
                .with_date_range(DateRange::new("updated", Some(day(2020, 1, 1)), Some(day(2020, 12, 31)))),
        );
    let builder = ChainedQueryBuilder::new()
        .with(DateRangeQueryBuilder, 0)
        .with(WindowProbe, 1);
    let options = QueryOptions::new();
    let mut search = SearchRequest::<Order>::new();

    configure_search(&builder, &source, &options, Some(&mut search)).await.unwrap();

    assert_eq!(
        search.to_body(),
        json!({"query": {"bool": {
            "must": [{"match_all": {}}],
            "filter": [{"range": {"created": {
                "gte": "2024-01-01T00:00:00+00:00",
                "lte": "2024-01-31T00:00:00+00:00"
            }}}]
        }}})
    );

    // Visitors see the same window through Data
    let mut ctx = QueryBuilderContext::<Order>::new(&source, &options, None);
    WindowProbe.build(&mut ctx).await.unwrap();
    assert_eq!(ctx.data().get("probe.start"), Some(&json!("2024-01-01T00:00:00+00:00")));
    assert_eq!(ctx.data().get("probe.end"), Some(&json!("2024-01-31T00:00:00+00:00")));
}

#[tokio::test]
async fn system_filter_range_used_when_source_has_none() {
    let source = RepositoryQuery::new().with_system_filter(
        RepositoryQuery::new().with_date_range(DateRange::new("updated", Some(day(2023, 3, 1)), None)),
    );
    let options = QueryOptions::new();
    let ctx = QueryBuilderContext::<Order>::new(&source, &options, None);

    assert_eq!(ctx.date_range().unwrap().field, "updated");
    assert_eq!(ctx.data().start_date(), Some(day(2023, 3, 1)));
    assert!(ctx.data().end_date().unwrap() > Utc::now());
}

#[tokio::test]
async fn aliases_and_includes_reach_the_engine_body() {
    let source = RepositoryQuery::new()
        .with_filter("status:open @include:recent")
        .with_search("widget")
        .with_ids(["o-1", "o-2"]);
    let options = QueryOptions::new()
        .with_alias_resolver(AliasMap::new().with("status", "state.code").with("id", "order_id"))
        .with_include_resolver(IncludeMap::new().with("recent", "created:>now-7d"))
        .with_default_field("description")
        .with_scoring(true);

    let query = build_query(&stock_builder(), &source, &options, None::<&mut SearchRequest<Order>>)
        .await
        .unwrap();

    let mut search = SearchRequest::<Order>::new();
    search.set_query(query);
    assert_eq!(
        search.to_body(),
        json!({"query": {"bool": {
            "must": [{"query_string": {
                "query": "widget",
                "default_field": "description",
                "default_operator": "OR"
            }}],
            "filter": [{"bool": {"must": [
                {"query_string": {
                    "query": "state.code:open (created:>now-7d)",
                    "default_field": "description",
                    "default_operator": "OR"
                }},
                {"terms": {"order_id": ["o-1", "o-2"]}}
            ]}}]
        }}})
    );
}

#[tokio::test]
async fn custom_source_and_builder() {
    let builder = stock_builder().with(TenantBuilder, 5);
    let options = QueryOptions::new().with_alias_resolver(AliasMap::new().with("tenant", "tenant_id"));

    let query = build_query(
        &builder,
        &TenantQuery { tenant: "acme".into() },
        &options,
        None::<&mut SearchRequest<Order>>,
    )
    .await
    .unwrap();
    let mut search = SearchRequest::<Order>::new();
    search.set_query(query);
    assert_eq!(
        search.to_body()["query"]["bool"]["filter"],
        json!([{"term": {"tenant_id": "acme"}}])
    );

    let err = build_query(
        &builder,
        &TenantQuery { tenant: String::new() },
        &options,
        None::<&mut SearchRequest<Order>>,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, QueryError::Builder(_)));
}

#[tokio::test]
async fn configure_search_without_request_fails() {
    let err = configure_search(
        &stock_builder(),
        &RepositoryQuery::new(),
        &QueryOptions::new(),
        None::<&mut SearchRequest<Order>>,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, QueryError::InvalidArgument { name: "search", .. }));
    assert!(err.to_string().contains("search"));
}

#[tokio::test]
async fn configured_request_runs_against_client() {
    let client = Arc::new(InMemorySearchClient::new().with_alias("orders", "orders-v2"));
    client.add_hit(SearchHit::new("1", "orders-v2", json!({"id": "1", "status": "open"})));

    let mut request = SearchRequest::<Order>::new().with_page(0, 10);
    configure_search(
        &stock_builder(),
        &RepositoryQuery::new().with_filter("status:open"),
        &QueryOptions::new(),
        Some(&mut request),
    )
    .await
    .unwrap();

    let orders = search(client.as_ref(), "orders", &request).await.unwrap();

    assert_eq!(orders, vec![Order { id: "1".into(), status: "open".into() }]);
    let recorded = client.searches();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].index, "orders");
    assert_eq!(recorded[0].body["size"], json!(10));
}
