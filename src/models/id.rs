//! Identity encoding for tracked resources.
//!
//! Both resource types are keyed by (environment, name) and tracked by the
//! host as a single string.

use crate::error::{ProviderError, Result};

/// Separator between environment and name. Environment names cannot contain it.
pub const ID_SEPARATOR: char = ':';

/// Joins environment and name into one identifier.
pub fn encode_id(environment_name: &str, name: &str) -> String {
    format!("{}{}{}", environment_name, ID_SEPARATOR, name)
}

/// Splits an identifier back into (environment, name).
///
/// Splits on the first separator, so names may themselves contain it.
pub fn decode_id(id: &str) -> Result<(String, String)> {
    match id.split_once(ID_SEPARATOR) {
        Some((env, name)) if !env.is_empty() && !name.is_empty() => {
            Ok((env.to_string(), name.to_string()))
        }
        _ => Err(ProviderError::InvalidId(format!(
            "expected '<environment>{}<name>', got '{}'",
            ID_SEPARATOR, id
        ))),
    }
}
