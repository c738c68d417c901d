//! Wire and domain models for the management API
//!
//! Wire structs (`*Body`, `Attribute`, `ExpirySettings`) mirror the JSON
//! exchanged with the API; domain structs (`Cache`, `Kvm`) carry the
//! environment name and model mutually exclusive fields as enums.

pub mod cache;
pub mod id;
pub mod kvm;


use serde::{Deserialize, Deserializer};

// Re-export commonly used types
pub use cache::{Cache, CacheBody, Expiry, ExpirySettings, ExpiryValue};
pub use id::{decode_id, encode_id, ID_SEPARATOR};
pub use kvm::{Attribute, Kvm, KvmBody, KvmEntries};

/// Deserializes `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
