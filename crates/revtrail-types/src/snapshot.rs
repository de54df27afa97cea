//! Full entity snapshots.
//!
//! An [`EntitySnapshot`] is the complete entity-name to content map for one
//! revision. Content is arbitrary JSON and is only ever compared, never
//! interpreted, by the diff engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TypeError, TypeResult};

/// Entity name to content map for one revision.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntitySnapshot {
    entities: BTreeMap<String, Value>,
}

impl EntitySnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from a JSON object.
    pub fn from_json(json: &str) -> TypeResult<Self> {
        serde_json::from_str(json).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Insert or replace an entity.
    pub fn insert(&mut self, name: impl Into<String>, content: Value) -> Option<Value> {
        self.entities.insert(name.into(), content)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entities.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// Entity names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entities.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.entities
    }
}

impl From<BTreeMap<String, Value>> for EntitySnapshot {
    fn from(entities: BTreeMap<String, Value>) -> Self {
        Self { entities }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for EntitySnapshot {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entities: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_and_query() {
        let snap = EntitySnapshot::from_json(r#"{"B": {"x": 1}, "A": null}"#).unwrap();
        assert_eq!(snap.len(), 2);
        assert!(snap.contains("A"));
        assert_eq!(snap.get("B"), Some(&json!({"x": 1})));
        assert_eq!(snap.names().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(EntitySnapshot::from_json("[1, 2]").is_err());
    }

    #[test]
    fn collect_from_pairs() {
        let snap: EntitySnapshot = [("A", json!(1)), ("B", json!(2))].into_iter().collect();
        assert_eq!(snap.len(), 2);
        assert!(!snap.is_empty());
        assert_eq!(serde_json::to_value(&snap).unwrap(), json!({"A": 1, "B": 2}));
    }
}
