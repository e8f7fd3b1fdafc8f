//! Sparse field sets for partial updates.
//!
//! A [`Patch`] keeps the JSON object exactly as supplied, so a key that was omitted and a
//! key that was explicitly set to `null` stay distinguishable. Edit operations only look at
//! keys that are present.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Partial update payload keyed by camelCase field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch(Map<String, Value>);

/// Presence-aware view of a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<T> {
    Absent,
    Null,
    Present(T),
}

impl<T> FieldValue<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn present(self) -> Option<T> {
        match self {
            FieldValue::Present(value) => Some(value),
            FieldValue::Absent | FieldValue::Null => None,
        }
    }
}

/// A present key whose value does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field '{key}' has an invalid value")]
pub struct InvalidField {
    pub key: String,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by callers assembling patches in code.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Keys outside `allowed`, in key order.
    pub fn keys_outside<'a>(&'a self, allowed: &'a [&'a str]) -> impl Iterator<Item = &'a str> {
        self.keys().filter(move |key| !allowed.contains(key))
    }

    pub fn field<T: DeserializeOwned>(&self, key: &str) -> Result<FieldValue<T>, InvalidField> {
        match self.0.get(key) {
            None => Ok(FieldValue::Absent),
            Some(Value::Null) => Ok(FieldValue::Null),
            Some(value) => serde_json::from_value(value.clone())
                .map(FieldValue::Present)
                .map_err(|_| InvalidField {
                    key: key.to_string(),
                }),
        }
    }

    /// Nested object fields (for example configuration sections) as their own patch.
    pub fn nested(&self, key: &str) -> Result<FieldValue<Patch>, InvalidField> {
        match self.0.get(key) {
            None => Ok(FieldValue::Absent),
            Some(Value::Null) => Ok(FieldValue::Null),
            Some(Value::Object(map)) => Ok(FieldValue::Present(Patch(map.clone()))),
            Some(_) => Err(InvalidField {
                key: key.to_string(),
            }),
        }
    }
}

impl From<Map<String, Value>> for Patch {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn distinguishes_absent_null_and_present() {
        let patch: Patch =
            serde_json::from_value(json!({ "overallRating": null, "communication": 4 }))
                .expect("object parses");

        assert_eq!(patch.field::<u8>("technicalSkill"), Ok(FieldValue::Absent));
        assert_eq!(patch.field::<u8>("overallRating"), Ok(FieldValue::Null));
        assert_eq!(patch.field::<u8>("communication"), Ok(FieldValue::Present(4)));
    }

    #[test]
    fn reports_values_of_the_wrong_shape() {
        let patch = Patch::new().with("technicalRounds", "two");
        let err = patch.field::<u8>("technicalRounds").expect_err("string is not a u8");
        assert_eq!(err.key, "technicalRounds");
    }

    #[test]
    fn lists_keys_outside_the_allowed_set() {
        let patch = Patch::new()
            .with("driveName", "Campus")
            .with("createdBy", 7)
            .with("color", "blue");

        let outside: Vec<_> = patch.keys_outside(&["driveName"]).collect();
        assert_eq!(outside.len(), 2);
        assert!(outside.contains(&"createdBy"));
        assert!(outside.contains(&"color"));
    }
}
