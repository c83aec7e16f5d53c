//! Insert-only annotations attached to a node by its handlers.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    /// Insert or overwrite `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Value for `key`, or `default` when absent.
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.0.get(key).cloned().unwrap_or(default)
    }

    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_existing_key_when_inserting_then_overwrites() {
        let mut metadata = Metadata::default();
        metadata.insert("rank", 1);
        metadata.insert("rank", 2);

        assert_eq!(metadata.get("rank"), Some(&json!(2)));
        assert_eq!(metadata.len(), 1);
    }

    #[test]
    fn given_missing_key_when_reading_with_default_then_returns_default() {
        let metadata = Metadata::default();
        assert_eq!(metadata.get_or("missing", json!("fallback")), json!("fallback"));
        assert!(metadata.get("missing").is_none());
    }
}
