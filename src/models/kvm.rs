//! Environment key-value map model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::encode_id;
use super::null_as_default;

/// One name/value entry; also the body of single-entry add/modify calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// KVM JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvmBody {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub encrypted: bool,
    #[serde(
        rename = "entry",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub entries: Vec<Attribute>,
}

/// Entries of a map, tagged by whether the map is encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvmEntries {
    Plain(BTreeMap<String, String>),
    Sensitive(BTreeMap<String, String>),
}

impl Default for KvmEntries {
    fn default() -> Self {
        KvmEntries::Plain(BTreeMap::new())
    }
}

impl KvmEntries {
    pub fn new(encrypted: bool, entries: BTreeMap<String, String>) -> Self {
        if encrypted {
            KvmEntries::Sensitive(entries)
        } else {
            KvmEntries::Plain(entries)
        }
    }

    pub fn encrypted(&self) -> bool {
        matches!(self, KvmEntries::Sensitive(_))
    }

    pub fn map(&self) -> &BTreeMap<String, String> {
        match self {
            KvmEntries::Plain(m) | KvmEntries::Sensitive(m) => m,
        }
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        match self {
            KvmEntries::Plain(m) | KvmEntries::Sensitive(m) => m,
        }
    }
}

/// A key-value map in one environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kvm {
    pub environment_name: String,
    pub name: String,
    pub entries: KvmEntries,
}

impl Kvm {
    pub fn new(environment_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            environment_name: environment_name.into(),
            name: name.into(),
            entries: KvmEntries::default(),
        }
    }

    pub fn encrypted(&self) -> bool {
        self.entries.encrypted()
    }

    /// Identifier the host tracks this map by.
    pub fn encode_id(&self) -> String {
        encode_id(&self.environment_name, &self.name)
    }

    pub fn to_body(&self) -> KvmBody {
        KvmBody {
            name: self.name.clone(),
            encrypted: self.encrypted(),
            entries: self
                .entries
                .map()
                .iter()
                .map(|(name, value)| Attribute::new(name, value))
                .collect(),
        }
    }

    /// Rebuilds the domain object; later duplicates of a name win.
    pub fn from_body(environment_name: impl Into<String>, body: KvmBody) -> Self {
        let entries = body
            .entries
            .into_iter()
            .map(|a| (a.name, a.value))
            .collect();
        Self {
            environment_name: environment_name.into(),
            name: body.name,
            entries: KvmEntries::new(body.encrypted, entries),
        }
    }
}
