//! DSL Translator
//!
//! Translates the Query AST into the search engine's JSON query DSL.
//!
//! # Mapping
//!
//! ```text
//! MatchAll                  → {"match_all": {}}
//! Equals                    → {"term": {field: value}}
//! Contains                  → {"match": {field: text}}
//! Range (date)              → {"range": {field: {"gte": .., "lte": ..}}}
//! In                        → {"terms": {field: [..]}}
//! Exists                    → {"exists": {"field": field}}
//! And                       → {"bool": {"must": [..]}}
//! Bool                      → {"bool": {..non-empty clauses..}}
//! ```

use serde_json::{json, Map, Value};

use super::ast::{BoolQuery, FieldOperator, FieldQuery, Operator, Query, QueryNode, QueryValue};

/// Query DSL translator
pub struct DslTranslator;

impl DslTranslator {
    /// Translate Query AST to a JSON query body
    pub fn translate(query: &Query) -> Value {
        Self::translate_node(&query.root)
    }

    fn translate_node(node: &QueryNode) -> Value {
        match node {
            QueryNode::MatchAll => json!({"match_all": {}}),
            QueryNode::Field(field_query) => Self::translate_field(field_query),
            QueryNode::QueryString(qs) => {
                let mut body = Map::new();
                body.insert("query".into(), Value::String(qs.query.clone()));
                if let Some(field) = &qs.default_field {
                    body.insert("default_field".into(), Value::String(field.clone()));
                }
                let op = match qs.default_operator {
                    Operator::And => "AND",
                    Operator::Or => "OR",
                };
                body.insert("default_operator".into(), Value::String(op.into()));
                json!({"query_string": body})
            }
            QueryNode::And(nodes) => match nodes.as_slice() {
                [single] => Self::translate_node(single),
                _ => json!({"bool": {"must": Self::translate_all(nodes)}}),
            },
            QueryNode::Bool(b) => Self::translate_bool(b),
        }
    }

    fn translate_all(nodes: &[QueryNode]) -> Vec<Value> {
        nodes.iter().map(Self::translate_node).collect()
    }

    fn translate_bool(b: &BoolQuery) -> Value {
        let mut body = Map::new();
        for (name, clauses) in [
            ("must", &b.must),
            ("filter", &b.filter),
            ("should", &b.should),
            ("must_not", &b.must_not),
        ] {
            if !clauses.is_empty() {
                body.insert(name.into(), Value::Array(Self::translate_all(clauses)));
            }
        }
        json!({"bool": body})
    }

    fn translate_field(field: &FieldQuery) -> Value {
        let name = field.field.as_str();

        match (&field.operator, &field.value) {
            (FieldOperator::Equals, QueryValue::Text(text)) => json!({"term": {name: text}}),
            (FieldOperator::Equals, QueryValue::Boolean(b)) => json!({"term": {name: b}}),
            (FieldOperator::Contains, QueryValue::Text(text)) => json!({"match": {name: text}}),
            (FieldOperator::Range, QueryValue::DateRange { start, end }) => {
                let mut bounds = Map::new();
                if let Some(start) = start {
                    bounds.insert("gte".into(), Value::String(start.to_rfc3339()));
                }
                if let Some(end) = end {
                    bounds.insert("lte".into(), Value::String(end.to_rfc3339()));
                }
                json!({"range": {name: bounds}})
            }
            (FieldOperator::In, QueryValue::Tags(tags)) => json!({"terms": {name: tags}}),
            (FieldOperator::Exists, _) => json!({"exists": {"field": name}}),
            _ => {
                // Fallback for unsupported combinations
                let value = serde_json::to_value(&field.value).unwrap_or(Value::Null);
                json!({"term": {name: value}})
            }
        }
    }
}
