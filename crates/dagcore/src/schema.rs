//! JSON-schema subset for checking caller data before a calculation.

use crate::{ValidationError, Value, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Object schema: per-property value kinds plus required property names.
///
/// Deserializes from the usual JSON-schema layout,
/// `{"type": "object", "properties": {"a": {"type": "number"}}}`; other
/// keywords are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSchema {
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySchema>,
    #[serde(default)]
    pub required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: ValueKind,
}

impl DataSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(json)
    }

    pub fn property(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.properties.insert(name.into(), PropertySchema { kind });
        self
    }

    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Check caller data; properties are visited in name order so the first
    /// reported mismatch is stable.
    pub fn validate(&self, data: &HashMap<String, Value>) -> Result<(), ValidationError> {
        let mut missing: Vec<String> = self
            .required
            .iter()
            .filter(|name| !data.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(ValidationError::Needed(missing));
        }

        for (name, property) in &self.properties {
            if let Some(value) = data.get(name) {
                if !property.kind.matches(value) {
                    return Err(ValidationError::Schema {
                        field: name.clone(),
                        expected: property.kind.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
