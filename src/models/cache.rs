//! Cache model
//!
//! An Apigee environment cache. The three expiry policies are mutually
//! exclusive; the wire format carries them as three optional holders.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use super::id::encode_id;
use super::null_as_default;

// == Wire Types ==
/// Holder for a single expiry setting value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryValue {
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

impl ExpiryValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// `expirySettings` object as exchanged with the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_in_sec: Option<ExpiryValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<ExpiryValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<ExpiryValue>,
}

impl ExpirySettings {
    /// Picks the effective policy.
    ///
    /// Empty values are ignored. When a response carries more than one, the
    /// first non-empty one wins in the order timeout, time of day, date.
    pub fn expiry(&self) -> Option<Expiry> {
        fn non_empty(v: &Option<ExpiryValue>) -> Option<String> {
            v.as_ref()
                .filter(|v| !v.value.is_empty())
                .map(|v| v.value.clone())
        }

        non_empty(&self.timeout_in_sec)
            .map(Expiry::TimeoutInSec)
            .or_else(|| non_empty(&self.time_of_day).map(Expiry::TimeOfDay))
            .or_else(|| non_empty(&self.expiry_date).map(Expiry::ExpiryDate))
    }
}

impl From<Option<&Expiry>> for ExpirySettings {
    fn from(expiry: Option<&Expiry>) -> Self {
        let mut settings = ExpirySettings::default();
        match expiry {
            Some(Expiry::TimeoutInSec(v)) => settings.timeout_in_sec = Some(ExpiryValue::new(v)),
            Some(Expiry::TimeOfDay(v)) => settings.time_of_day = Some(ExpiryValue::new(v)),
            Some(Expiry::ExpiryDate(v)) => settings.expiry_date = Some(ExpiryValue::new(v)),
            None => {}
        }
        settings
    }
}

/// Cache JSON body. The environment is part of the path, never the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheBody {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expiry_settings: ExpirySettings,
    #[serde(
        rename = "skipCacheIfElementSizeInKBExceeds",
        default,
        deserialize_with = "size_in_kb",
        skip_serializing_if = "is_zero"
    )]
    pub skip_cache_if_element_size_in_kb_exceeds: u64,
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}

/// The API reports the threshold as a numeric string; accept both forms.
fn size_in_kb<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(0),
        Some(NumberOrString::Number(n)) => Ok(n),
        Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(0),
        Some(NumberOrString::String(s)) => s.trim().parse().map_err(de::Error::custom),
    }
}

// == Domain Types ==
/// Mutually exclusive cache expiry policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiry {
    /// Seconds after which entries expire
    TimeoutInSec(String),
    /// Daily expiry at `HH:MM:SS`
    TimeOfDay(String),
    /// Fixed expiry on `MM-DD-YYYY`
    ExpiryDate(String),
}

impl Expiry {
    pub fn value(&self) -> &str {
        match self {
            Expiry::TimeoutInSec(v) | Expiry::TimeOfDay(v) | Expiry::ExpiryDate(v) => v,
        }
    }
}

/// A cache in one environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cache {
    pub environment_name: String,
    pub name: String,
    pub description: String,
    pub expiry: Option<Expiry>,
    /// Elements above this size (KB) are not cached; `None` leaves the server default
    pub skip_cache_if_element_size_in_kb_exceeds: Option<u64>,
}

impl Cache {
    pub fn new(environment_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            environment_name: environment_name.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Identifier the host tracks this cache by.
    pub fn encode_id(&self) -> String {
        encode_id(&self.environment_name, &self.name)
    }

    /// Builds the request body.
    pub fn to_body(&self) -> CacheBody {
        CacheBody {
            name: self.name.clone(),
            description: Some(self.description.clone()).filter(|d| !d.is_empty()),
            expiry_settings: ExpirySettings::from(self.expiry.as_ref()),
            skip_cache_if_element_size_in_kb_exceeds: self
                .skip_cache_if_element_size_in_kb_exceeds
                .unwrap_or(0),
        }
    }

    /// Rebuilds the domain object from a response body.
    pub fn from_body(environment_name: impl Into<String>, body: CacheBody) -> Self {
        Self {
            environment_name: environment_name.into(),
            expiry: body.expiry_settings.expiry(),
            name: body.name,
            description: body.description.unwrap_or_default(),
            skip_cache_if_element_size_in_kb_exceeds: Some(
                body.skip_cache_if_element_size_in_kb_exceeds,
            )
            .filter(|kb| *kb != 0),
        }
    }
}
