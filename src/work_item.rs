// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Reindex work items.
//!
//! A [`ReindexWorkItem`] is handed to the work queue when an index's alias
//! still points at an older schema version. An out-of-process worker copies
//! the documents, swaps the alias and (optionally) drops the old index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::OrchestratorError;
use crate::index::ChildType;

/// Join relationship the reindex worker must preserve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentMap {
    /// Child document type
    #[serde(rename = "type")]
    pub child_type: String,
    /// Field path holding the parent id
    pub parent_path: String,
}

impl From<&ChildType> for ParentMap {
    fn from(child: &ChildType) -> Self {
        Self {
            child_type: child.name.clone(),
            parent_path: child.parent_path.clone(),
        }
    }
}

/// Durable description of one version migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexWorkItem {
    pub old_index: String,
    pub new_index: String,
    pub alias: String,
    #[serde(default)]
    pub parent_maps: Vec<ParentMap>,
    /// Remove `old_index` once the migration completes
    pub delete_old: bool,
}

impl ReindexWorkItem {
    /// Create a work item. All three names must be non-empty.
    pub fn new(
        old_index: impl Into<String>,
        new_index: impl Into<String>,
        alias: impl Into<String>,
    ) -> Result<Self, OrchestratorError> {
        let item = Self {
            old_index: old_index.into(),
            new_index: new_index.into(),
            alias: alias.into(),
            parent_maps: Vec::new(),
            delete_old: true,
        };

        for (name, value) in [
            ("old_index", &item.old_index),
            ("new_index", &item.new_index),
            ("alias", &item.alias),
        ] {
            if value.is_empty() {
                return Err(OrchestratorError::invalid_argument(name, "must not be empty"));
            }
        }

        Ok(item)
    }

    #[must_use]
    pub fn with_delete_old(mut self, delete_old: bool) -> Self {
        self.delete_old = delete_old;
        self
    }

    #[must_use]
    pub fn with_parent_maps<'a, I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = &'a ChildType>,
    {
        self.parent_maps.extend(children.into_iter().map(ParentMap::from));
        self
    }

    /// Key of the lock the worker holds while migrating this tuple.
    #[must_use]
    pub fn migration_lock_key(&self, prefix: &str) -> String {
        format!("{}{}{}{}", prefix, self.alias, self.old_index, self.new_index)
    }
}

/// A work item as stored by a queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedWorkItem {
    pub id: Uuid,
    pub enqueued_at: DateTime<Utc>,
    pub item: ReindexWorkItem,
}

impl QueuedWorkItem {
    #[must_use]
    pub fn new(item: ReindexWorkItem) -> Self {
        Self {
            id: Uuid::new_v4(),
            enqueued_at: Utc::now(),
            item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_defaults_to_delete_old() {
        let item = ReindexWorkItem::new("orders-v1", "orders-v2", "orders").unwrap();
        assert!(item.delete_old);
        assert!(item.parent_maps.is_empty());
    }

    #[test]
    fn test_empty_names_rejected() {
        let err = ReindexWorkItem::new("", "orders-v2", "orders").unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidArgument { name: "old_index", .. }));

        let err = ReindexWorkItem::new("orders-v1", "orders-v2", "").unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidArgument { name: "alias", .. }));
    }

    #[test]
    fn test_migration_lock_key() {
        let item = ReindexWorkItem::new("orders-v1", "orders-v2", "orders").unwrap();
        assert_eq!(item.migration_lock_key("reindex:"), "reindex:ordersorders-v1orders-v2");
    }

    #[test]
    fn test_parent_maps_from_child_types() {
        let children = vec![
            ChildType::new("line", "order_id"),
            ChildType::new("note", "order_id"),
        ];
        let item = ReindexWorkItem::new("orders-v1", "orders-v2", "orders")
            .unwrap()
            .with_parent_maps(&children);

        assert_eq!(item.parent_maps.len(), 2);
        assert_eq!(item.parent_maps[0].child_type, "line");
        assert_eq!(item.parent_maps[1].parent_path, "order_id");
    }

    #[test]
    fn test_serialized_shape() {
        let item = ReindexWorkItem::new("orders-v1", "orders-v2", "orders")
            .unwrap()
            .with_parent_maps(&[ChildType::new("line", "order_id")]);

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            json!({
                "old_index": "orders-v1",
                "new_index": "orders-v2",
                "alias": "orders",
                "parent_maps": [{"type": "line", "parent_path": "order_id"}],
                "delete_old": true
            })
        );
    }
}
