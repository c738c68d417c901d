//! Management API endpoint templates.
//!
//! Each function fills one fixed pattern; paths are relative to the
//! `/v1/` base URL. Every dynamic part is percent-encoded as a single path
//! segment, so `/`, `?`, `#` and `%` in names stay inside their segment.
//! Dot segments (`.` and `..`) cannot be expressed this way and are
//! rejected by the schema before a path is built.

use std::borrow::Cow;

fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

pub fn cache_path(org: &str, env: &str) -> String {
    format!("o/{}/e/{}/caches", segment(org), segment(env))
}

pub fn cache_path_get(org: &str, env: &str, name: &str) -> String {
    format!("{}/{}", cache_path(org, env), segment(name))
}

pub fn environment_kvm_path(org: &str, env: &str) -> String {
    format!("o/{}/e/{}/keyvaluemaps", segment(org), segment(env))
}

pub fn environment_kvm_path_get(org: &str, env: &str, name: &str) -> String {
    format!("{}/{}", environment_kvm_path(org, env), segment(name))
}

/// Collection of entries; POSTing here adds a single entry.
pub fn environment_kvm_path_entries(org: &str, env: &str, name: &str) -> String {
    format!("{}/entries", environment_kvm_path_get(org, env, name))
}

/// One entry; POST modifies it, DELETE removes it.
pub fn environment_kvm_path_entries_get(org: &str, env: &str, name: &str, key: &str) -> String {
    format!("{}/{}", environment_kvm_path_entries(org, env, name), segment(key))
}
