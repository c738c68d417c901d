//! Schema Module
//!
//! Declares the attribute surface of each resource and validates
//! configuration against it before any request is made.

mod resource_data;
pub mod validators;

pub use resource_data::{is_zero, Attributes, ResourceData};

use serde_json::Value;

use crate::error::{ProviderError, Result};

/// Checks one string value; the message names what is wrong with it.
pub type Validator = fn(&str) -> std::result::Result<(), String>;

/// Value kinds an attribute may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Int,
    Bool,
    StringMap,
}

impl ValueType {
    fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ValueType::String, Value::String(_)) => true,
            (ValueType::Int, Value::Number(n)) => n.is_u64(),
            (ValueType::Bool, Value::Bool(_)) => true,
            (ValueType::StringMap, Value::Object(o)) => o
                .values()
                .all(|v| matches!(v, Value::String(_) | Value::Number(_) | Value::Bool(_))),
            _ => false,
        }
    }
}

/// One configurable attribute.
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: &'static str,
    pub value_type: ValueType,
    pub required: bool,
    /// Changing the value replaces the resource instead of updating it
    pub force_new: bool,
    /// Value is masked in logs
    pub sensitive: bool,
    pub conflicts_with: &'static [&'static str],
    pub validate: Option<Validator>,
    /// Checks every key of a map value
    pub validate_keys: Option<Validator>,
}

impl AttributeSchema {
    pub const fn required(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            value_type,
            required: true,
            force_new: false,
            sensitive: false,
            conflicts_with: &[],
            validate: None,
            validate_keys: None,
        }
    }

    pub const fn optional(name: &'static str, value_type: ValueType) -> Self {
        Self {
            required: false,
            ..Self::required(name, value_type)
        }
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn conflicts_with(mut self, others: &'static [&'static str]) -> Self {
        self.conflicts_with = others;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validate = Some(validator);
        self
    }

    pub fn validate_keys(mut self, validator: Validator) -> Self {
        self.validate_keys = Some(validator);
        self
    }

    /// Whether prior and current differ, comparing maps as coerced strings.
    fn changed(&self, data: &ResourceData) -> bool {
        match self.value_type {
            ValueType::StringMap => data.has_string_map_change(self.name),
            _ => data.has_change(self.name),
        }
    }
}

/// Full attribute surface of one resource type.
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub type_name: &'static str,
    pub attributes: Vec<AttributeSchema>,
}

impl ResourceSchema {
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Validates the current configuration.
    ///
    /// Rejects unknown attributes, wrong value types, missing required
    /// attributes and conflicting attributes set together. Values (and map
    /// keys) must pass their validators.
    pub fn validate(&self, data: &ResourceData) -> Result<()> {
        for (key, value) in data.current() {
            let attribute = self.attribute(key).ok_or_else(|| {
                invalid(format!("{}: unsupported attribute '{}'", self.type_name, key))
            })?;
            if !attribute.value_type.accepts(value) {
                return Err(invalid(format!(
                    "{}: attribute '{}' must be of type {:?}",
                    self.type_name, key, attribute.value_type
                )));
            }
        }

        for attribute in &self.attributes {
            let value = data.get_ok(attribute.name);
            if attribute.required && value.is_none() {
                return Err(invalid(format!(
                    "{}: attribute '{}' is required",
                    self.type_name, attribute.name
                )));
            }
            let Some(value) = value else { continue };

            if let Some(other) = attribute
                .conflicts_with
                .iter()
                .find(|other| data.get_ok(other).is_some())
            {
                return Err(invalid(format!(
                    "{}: '{}' conflicts with '{}'",
                    self.type_name, attribute.name, other
                )));
            }

            if let (Some(validator), Value::String(s)) = (attribute.validate, value) {
                validator(s).map_err(|reason| {
                    invalid(format!(
                        "{}: attribute '{}': {}",
                        self.type_name, attribute.name, reason
                    ))
                })?;
            }

            if let (Some(validator), Value::Object(map)) = (attribute.validate_keys, value) {
                for key in map.keys() {
                    validator(key).map_err(|reason| {
                        invalid(format!(
                            "{}: attribute '{}' key '{}': {}",
                            self.type_name, attribute.name, key, reason
                        ))
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Force-new attributes whose value differs between prior and current.
    pub fn replacement_reasons(&self, data: &ResourceData) -> Vec<&'static str> {
        self.attributes
            .iter()
            .filter(|a| a.force_new && a.changed(data))
            .map(|a| a.name)
            .collect()
    }

    /// True when any declared attribute differs between prior and current.
    pub fn has_changes(&self, data: &ResourceData) -> bool {
        self.attributes.iter().any(|a| a.changed(data))
    }

    /// Copy of the attributes with sensitive values masked.
    pub fn redacted(&self, attributes: &Attributes) -> Attributes {
        attributes
            .iter()
            .map(|(key, value)| {
                let masked = self.attribute(key).is_some_and(|a| a.sensitive) && !is_zero(value);
                let value = if masked {
                    Value::String("(sensitive)".to_string())
                } else {
                    value.clone()
                };
                (key.clone(), value)
            })
            .collect()
    }
}

fn invalid(message: String) -> ProviderError {
    ProviderError::InvalidConfig(message)
}
