//! Host-side resource state.
//!
//! `ResourceData` holds the tracked identifier plus two attribute maps:
//! `prior` is the last saved state, `current` is the desired configuration
//! and, after a read, the refreshed state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProviderError, Result};

/// Attribute name to value.
pub type Attributes = BTreeMap<String, Value>;

/// Returns true for values the host treats as "not set".
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(default)]
    id: String,
    #[serde(default)]
    prior: Attributes,
    #[serde(default, rename = "attributes")]
    current: Attributes,
}

impl ResourceData {
    /// Fresh configuration with no identity and no saved state.
    pub fn new(current: Attributes) -> Self {
        Self {
            current,
            ..Self::default()
        }
    }

    /// Saved state plus a (possibly changed) configuration.
    pub fn from_state(id: impl Into<String>, prior: Attributes, current: Attributes) -> Self {
        Self {
            id: id.into(),
            prior,
            current,
        }
    }

    /// Identity only, as produced by an import.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    // == Identity ==
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    // == Attribute Maps ==
    pub fn prior(&self) -> &Attributes {
        &self.prior
    }

    pub fn current(&self) -> &Attributes {
        &self.current
    }

    /// Saves the current attributes as the new prior state.
    pub fn commit(&mut self) {
        self.prior = self.current.clone();
    }

    // == Raw Access ==
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.current.get(key)
    }

    /// Current value, unless it is a zero value.
    pub fn get_ok(&self, key: &str) -> Option<&Value> {
        self.current.get(key).filter(|v| !is_zero(v))
    }

    /// (prior, current) for one attribute.
    pub fn get_change(&self, key: &str) -> (Option<&Value>, Option<&Value>) {
        (self.prior.get(key), self.current.get(key))
    }

    /// True when prior and current differ, treating zero values as absent.
    pub fn has_change(&self, key: &str) -> bool {
        let (old, new) = self.get_change(key);
        old.filter(|v| !is_zero(v)) != new.filter(|v| !is_zero(v))
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.current.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.current.remove(key);
    }

    /// Like `has_change`, but compares the values as coerced string maps.
    ///
    /// Falls back to the raw comparison when either side is not a map.
    pub fn has_string_map_change(&self, key: &str) -> bool {
        match self.get_string_map_change(key) {
            Ok((old, new)) => old != new,
            Err(_) => self.has_change(key),
        }
    }

    // == Typed Access ==
    /// Non-empty string value.
    pub fn get_str(&self, key: &str) -> Result<Option<String>> {
        match self.get_ok(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(type_error(key, "string", other)),
        }
    }

    pub fn get_required_str(&self, key: &str) -> Result<String> {
        self.get_str(key)?.ok_or_else(|| {
            ProviderError::InvalidConfig(format!("attribute '{}' is required", key))
        })
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(type_error(key, "bool", other)),
        }
    }

    /// Non-zero integer value.
    pub fn get_int(&self, key: &str) -> Result<Option<u64>> {
        match self.get_ok(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .map(Some)
                .ok_or_else(|| type_error(key, "non-negative integer", &Value::Number(n.clone()))),
            Some(other) => Err(type_error(key, "integer", other)),
        }
    }

    pub fn get_string_map(&self, key: &str) -> Result<BTreeMap<String, String>> {
        string_map(key, self.current.get(key))
    }

    /// (prior, current) string maps for one attribute.
    pub fn get_string_map_change(
        &self,
        key: &str,
    ) -> Result<(BTreeMap<String, String>, BTreeMap<String, String>)> {
        Ok((
            string_map(key, self.prior.get(key))?,
            string_map(key, self.current.get(key))?,
        ))
    }
}

fn string_map(key: &str, value: Option<&Value>) -> Result<BTreeMap<String, String>> {
    let object = match value {
        None | Some(Value::Null) => return Ok(BTreeMap::new()),
        Some(Value::Object(o)) => o,
        Some(other) => return Err(type_error(key, "map of strings", other)),
    };

    object
        .iter()
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => return Err(type_error(&format!("{}.{}", key, k), "string", other)),
            };
            Ok((k.clone(), v))
        })
        .collect()
}

fn type_error(key: &str, expected: &str, found: &Value) -> ProviderError {
    let kind = match found {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    };
    ProviderError::InvalidConfig(format!(
        "attribute '{}' must be a {}, found {}",
        key, expected, kind
    ))
}
