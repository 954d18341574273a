// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query AST
//!
//! Engine-neutral query tree that visitors build and [`DslTranslator`]
//! renders into the engine's JSON DSL.
//!
//! # Example
//!
//! ```rust
//! use search_coordinator::query::Query;
//!
//! // Several constraints, all required
//! let query = Query::field_eq("status", "active")
//!     .and(Query::tags("region", vec!["eu".into(), "us".into()]));
//!
//! // The empty query matches everything and is the identity for `and`
//! let query = Query::match_all().and(Query::field_eq("status", "active"));
//! assert_eq!(query, Query::field_eq("status", "active"));
//! ```
//!
//! [`DslTranslator`]: super::DslTranslator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Search query AST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Root query node
    pub root: QueryNode,
}

impl Default for Query {
    fn default() -> Self {
        Self::match_all()
    }
}

impl Query {
    /// Create a new query from a root node
    pub fn new(root: QueryNode) -> Self {
        Self { root }
    }

    /// Query matching every document
    pub fn match_all() -> Self {
        Self::new(QueryNode::MatchAll)
    }

    /// Create a field equals query
    pub fn field_eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::field(field, FieldOperator::Equals, QueryValue::Text(value.into()))
    }

    /// Create a tag membership query (any of `values`)
    pub fn tags(field: impl Into<String>, values: Vec<String>) -> Self {
        Self::field(field, FieldOperator::In, QueryValue::Tags(values))
    }

    /// Create an inclusive date range query
    pub fn date_range(
        field: impl Into<String>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        Self::field(field, FieldOperator::Range, QueryValue::DateRange { start, end })
    }

    /// Create a full-text search query (contains)
    pub fn text_search(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::field(field, FieldOperator::Contains, QueryValue::Text(text.into()))
    }

    /// Documents where `field` has any value
    pub fn exists(field: impl Into<String>) -> Self {
        Self::field(field, FieldOperator::Exists, QueryValue::Boolean(true))
    }

    /// Free-text query string in the engine's own syntax
    pub fn query_string(query: impl Into<String>) -> Self {
        Self::new(QueryNode::QueryString(QueryStringQuery {
            query: query.into(),
            default_field: None,
            default_operator: Operator::Or,
        }))
    }

    /// Boolean compound query
    pub fn bool(query: BoolQuery) -> Self {
        Self::new(QueryNode::Bool(query))
    }

    fn field(field: impl Into<String>, operator: FieldOperator, value: QueryValue) -> Self {
        Self::new(QueryNode::Field(FieldQuery {
            field: field.into(),
            operator,
            value,
        }))
    }

    /// Combine with AND.
    ///
    /// Match-all is the identity on either side, and nested ANDs are flattened.
    pub fn and(self, other: Query) -> Self {
        match (self.root, other.root) {
            (QueryNode::MatchAll, other) => Self::new(other),
            (this, QueryNode::MatchAll) => Self::new(this),
            (QueryNode::And(mut nodes), QueryNode::And(more)) => {
                nodes.extend(more);
                Self::new(QueryNode::And(nodes))
            }
            (QueryNode::And(mut nodes), other) => {
                nodes.push(other);
                Self::new(QueryNode::And(nodes))
            }
            (this, other) => Self::new(QueryNode::And(vec![this, other])),
        }
    }

    /// Whether this query places no constraint on the result set
    #[must_use]
    pub fn is_match_all(&self) -> bool {
        self.root.is_match_all()
    }
}

/// Query AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryNode {
    /// Matches every document
    MatchAll,
    /// Field query
    Field(FieldQuery),
    /// Engine-syntax query string
    QueryString(QueryStringQuery),
    /// Boolean AND
    And(Vec<QueryNode>),
    /// Compound scored/unscored query
    Bool(BoolQuery),
}

impl QueryNode {
    #[must_use]
    pub fn is_match_all(&self) -> bool {
        match self {
            QueryNode::MatchAll => true,
            QueryNode::And(nodes) => nodes.iter().all(QueryNode::is_match_all),
            QueryNode::Bool(b) => {
                b.should.is_empty()
                    && b.must_not.is_empty()
                    && b.must.iter().all(QueryNode::is_match_all)
                    && b.filter.iter().all(QueryNode::is_match_all)
            }
            _ => false,
        }
    }
}

/// Compound query.
///
/// `must` clauses contribute to relevance scoring, `filter` clauses don't.
/// Empty clause lists place no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoolQuery {
    #[serde(default)]
    pub must: Vec<QueryNode>,
    #[serde(default)]
    pub filter: Vec<QueryNode>,
    #[serde(default)]
    pub should: Vec<QueryNode>,
    #[serde(default)]
    pub must_not: Vec<QueryNode>,
}

/// Query string in the engine's syntax
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryStringQuery {
    pub query: String,
    pub default_field: Option<String>,
    pub default_operator: Operator,
}

/// Default operator between query-string terms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    And,
    #[default]
    Or,
}

/// Field query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldQuery {
    /// Field name (e.g., "status", "created_utc")
    pub field: String,
    /// Comparison operator
    pub operator: FieldOperator,
    /// Query value
    pub value: QueryValue,
}

/// Field comparison operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldOperator {
    /// Exact term match
    Equals,
    /// Analyzed text match
    Contains,
    /// Date range
    Range,
    /// Tag membership
    In,
    /// Field has a value
    Exists,
}

/// Query value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryValue {
    /// Text value
    Text(String),
    /// Date range [start, end]
    DateRange {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
    /// Tag values (OR semantics)
    Tags(Vec<String>),
    /// Boolean value
    Boolean(bool),
}
