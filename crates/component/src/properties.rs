//! Property maps and typed property records.

use std::collections::HashMap;
use std::collections::hash_map::Iter;

use dom::{HostFunction, HostValue};
use serde::de::DeserializeOwned;

use crate::error::ComponentError;

/// A name → value map of component properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Properties(HashMap<String, HostValue>);

impl Properties {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<HostValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Insert or overwrite one property.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<HostValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Shallow merge: every entry of `other` overwrites the same key here.
    pub fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Value of a property.
    pub fn get(&self, name: &str) -> Option<&HostValue> {
        self.0.get(name)
    }

    /// String value of a property.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(HostValue::as_str)
    }

    /// Whether the property is present.
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Property names, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.0.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over entries in arbitrary order.
    pub fn iter(&self) -> Iter<'_, String, HostValue> {
        self.0.iter()
    }

    /// Read a required string property.
    ///
    /// # Errors
    /// Fails if the property is missing or not a string.
    pub fn require_str(&self, name: &str) -> Result<&str, ComponentError> {
        self.get_str(name).ok_or_else(|| ComponentError::InvalidProperty {
            name: name.to_owned(),
            expected: "a string",
        })
    }

    /// Read an optional function property; nullish values yield `None`.
    ///
    /// # Errors
    /// Fails if the property holds something other than a function or a nullish value.
    pub fn optional_function(&self, name: &str) -> Result<Option<HostFunction>, ComponentError> {
        match self.get(name) {
            None | Some(HostValue::Undefined | HostValue::Null) => Ok(None),
            Some(HostValue::Function(function)) => Ok(Some(HostFunction::clone(function))),
            Some(_) => Err(ComponentError::InvalidProperty {
                name: name.to_owned(),
                expected: "a function",
            }),
        }
    }

    /// Decode a structured property into a typed record.
    ///
    /// # Errors
    /// Fails if the property is missing or does not decode.
    pub fn decode<T: DeserializeOwned>(&self, name: &str) -> Result<T, ComponentError> {
        let invalid = || ComponentError::InvalidProperty {
            name: name.to_owned(),
            expected: "a structured record",
        };
        let value = self.get(name).and_then(HostValue::as_json).ok_or_else(invalid)?;
        serde_json::from_value(value.clone()).map_err(|_error| invalid())
    }
}

impl<K: Into<String>, V: Into<HostValue>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// A closed, typed view over a component family's properties.
pub trait FromProperties: Sized {
    /// Decode the merged properties.
    ///
    /// # Errors
    /// Fails if a property is missing or has the wrong shape.
    fn from_properties(properties: &Properties) -> Result<Self, ComponentError>;
}

/// Build a [`Properties`] map inline.
///
/// ```ignore
/// let defaults = properties! { "text" => "Go", "item_id" => HostValue::Null };
/// ```
#[macro_export]
macro_rules! properties {
    () => {
        $crate::Properties::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut properties = $crate::Properties::new();
        $(
            properties.insert($name, $value);
        )+
        properties
    }};
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    /// Tests that merging overwrites per key and keeps the rest
    #[test]
    fn test_merge_overwrites_per_key() {
        let mut merged = properties! { "a" => 1.0, "b" => 2.0 };
        merged.merge(properties! { "b" => 5.0 });
        assert_eq!(merged, properties! { "a" => 1.0, "b" => 5.0 });
    }

    /// Tests typed decoding of a structured property
    #[test]
    fn test_decode() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Record {
            id: String,
        }
        let properties = properties! { "record" => json!({"id": "abc"}), "text" => "x" };
        assert_eq!(
            properties.decode::<Record>("record"),
            Ok(Record { id: "abc".to_owned() })
        );
        assert!(properties.decode::<Record>("text").is_err());
        assert!(properties.optional_function("missing").is_ok_and(|function| function.is_none()));
        assert!(properties.optional_function("text").is_err());
    }
}
