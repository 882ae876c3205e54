//! Ordered key/value attachments for calendar points.
//!
//! A [`PropertyBag`] lets callers stash arbitrary application data on a
//! point (a holiday name on a [`Day`](crate::Day), a sprint label on a
//! [`Week`](crate::Week)) without extending the point types. Values are
//! opaque JSON values; keys keep their insertion order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An insertion-ordered map from string keys to opaque values.
///
/// Lookups of missing keys never fail: [`get`](Self::get) returns `None`
/// and [`get_or`](Self::get_or) returns the caller's default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag {
    properties: Map<String, Value>,
}

impl PropertyBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all properties in insertion order.
    pub fn all(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Returns the property keys in insertion order.
    pub fn keys(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    /// Discard the current properties and store `properties` instead.
    pub fn replace<I, K, V>(&mut self, properties: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.properties.clear();
        self.add(properties);
    }

    /// Merge `properties` into the bag.
    ///
    /// Existing keys are overwritten in place; new keys are appended in the
    /// order they are yielded.
    pub fn add<I, K, V>(&mut self, properties: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in properties {
            self.properties.insert(key.into(), value.into());
        }
    }

    /// Returns the property stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Returns the property stored under `key`, or `default` if there is none.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        match self.properties.get(key) {
            Some(value) => value.clone(),
            None => default.into(),
        }
    }

    /// Store `value` under `key`, replacing any previous value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Returns true if a property is stored under `key`.
    pub fn has(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Remove the property stored under `key`, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.properties.shift_remove(key)
    }

    /// Returns the number of properties.
    pub fn count(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.properties.iter()
    }
}

impl From<Map<String, Value>> for PropertyBag {
    fn from(properties: Map<String, Value>) -> Self {
        Self { properties }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        bag.add(iter);
        bag
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for PropertyBag {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.add(iter);
    }
}

impl<'a> IntoIterator for &'a PropertyBag {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}

impl IntoIterator for PropertyBag {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_values() -> Vec<Value> {
        vec![
            Value::Null,
            json!(1),
            json!(0),
            json!(true),
            json!(false),
            json!("test"),
            json!({ "nested": [1, 2, 3] }),
        ]
    }

    #[test]
    fn test_get_and_set() {
        for property in sample_values() {
            let mut bag = PropertyBag::new();
            bag.set("prop1", property.clone());

            assert!(bag.has("prop1"));
            assert!(!bag.has("prop2"));
            assert_eq!(bag.get("prop1"), Some(&property));
            assert_eq!(bag.get_or("prop2", "missing"), json!("missing"));

            bag.remove("prop1");
            assert!(!bag.has("prop1"));
            assert_eq!(bag.get_or("prop1", "missing"), json!("missing"));
        }
    }

    #[test]
    fn test_null_value_is_not_missing() {
        let mut bag = PropertyBag::new();
        bag.set("prop1", Value::Null);
        assert!(bag.has("prop1"));
        assert_eq!(bag.get_or("prop1", "missing"), Value::Null);
    }

    #[test]
    fn test_iterates_in_insertion_order() {
        let bag: PropertyBag = [("b", 2), ("a", 1), ("c", 3)].into_iter().collect();

        let pairs: Vec<(&str, i64)> = bag
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_i64().unwrap_or_default()))
            .collect();
        assert_eq!(pairs, vec![("b", 2), ("a", 1), ("c", 3)]);

        let mut seen = Vec::new();
        for (key, _) in &bag {
            seen.push(key.clone());
        }
        assert_eq!(seen, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_modifies_properties() {
        let mut bag: PropertyBag = [("prop1", "prop1"), ("prop2", "prop2")]
            .into_iter()
            .collect();
        assert_eq!(bag.count(), 2);
        assert_eq!(bag.keys(), vec!["prop1", "prop2"]);

        bag.remove("prop2");
        assert_eq!(bag.count(), 1);
        assert_eq!(bag.keys(), vec!["prop1"]);
        assert_eq!(bag.all().get("prop1"), Some(&json!("prop1")));

        bag.replace([("prop2", "prop2")]);
        assert_eq!(bag.count(), 1);
        assert_eq!(bag.keys(), vec!["prop2"]);

        bag.add([("prop1", "prop1")]);
        assert_eq!(bag.count(), 2);
        assert_eq!(bag.keys(), vec!["prop2", "prop1"]);
    }

    #[test]
    fn test_add_overwrites_in_place() {
        let mut bag: PropertyBag = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        bag.add([("b", 20), ("d", 4)]);

        assert_eq!(bag.keys(), vec!["a", "b", "c", "d"]);
        assert_eq!(bag.get("b"), Some(&json!(20)));
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut bag: PropertyBag = [("a", 1), ("b", 2), ("c", 3), ("d", 4)]
            .into_iter()
            .collect();
        assert_eq!(bag.remove("b"), Some(json!(2)));
        assert_eq!(bag.remove("missing"), None);
        assert_eq!(bag.keys(), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_serializes_as_object() {
        let mut bag = PropertyBag::new();
        bag.set("holiday", "New Year");
        bag.set("office_closed", true);

        let encoded = serde_json::to_string(&bag).unwrap();
        assert_eq!(encoded, r#"{"holiday":"New Year","office_closed":true}"#);

        let decoded: PropertyBag = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, bag);
    }
}
