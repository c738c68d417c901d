//! Environment key-value map resource (`apigee_environment_kvm`)
//!
//! Entries surface through `entry` or `sensitive_entry` depending on the
//! encrypted flag. Updates are planned by [`plan_entry_update`] and then
//! executed one call at a time.

use std::collections::BTreeMap;

use reqwest::header::HeaderMap;
use reqwest::Method;
use tracing::{debug, info, warn};

use super::{ENVIRONMENT_NAME, NAME};
use crate::client::{json_headers, paths, ApigeeApi};
use crate::error::{ProviderError, Result};
use crate::models::{decode_id, Attribute, Kvm, KvmBody, KvmEntries};
use crate::schema::{validators, AttributeSchema, ResourceData, ResourceSchema, ValueType};

// == Attribute Names ==
pub const ENCRYPTED: &str = "encrypted";
pub const ENTRY: &str = "entry";
pub const SENSITIVE_ENTRY: &str = "sensitive_entry";

pub fn schema() -> ResourceSchema {
    ResourceSchema {
        type_name: "apigee_environment_kvm",
        attributes: vec![
            AttributeSchema::required(ENVIRONMENT_NAME, ValueType::String)
                .force_new()
                .validate(validators::path_segment),
            AttributeSchema::required(NAME, ValueType::String)
                .force_new()
                .validate(validators::path_segment),
            AttributeSchema::optional(ENCRYPTED, ValueType::Bool).force_new(),
            AttributeSchema::optional(ENTRY, ValueType::StringMap)
                .conflicts_with(&[SENSITIVE_ENTRY])
                .validate_keys(validators::path_segment),
            AttributeSchema::optional(SENSITIVE_ENTRY, ValueType::StringMap)
                .sensitive()
                .conflicts_with(&[ENTRY])
                .validate_keys(validators::path_segment),
        ],
    }
}

/// Attribute holding the entries for a map with this encrypted flag.
pub fn entry_attribute(encrypted: bool) -> &'static str {
    if encrypted {
        SENSITIVE_ENTRY
    } else {
        ENTRY
    }
}

/// Copies the encrypted flag and flag-selected entries into `kvm`.
pub fn fill_kvm(kvm: &mut Kvm, d: &ResourceData) -> Result<()> {
    let encrypted = d.get_bool(ENCRYPTED)?;
    let entries = d.get_string_map(entry_attribute(encrypted))?;
    kvm.entries = KvmEntries::new(encrypted, entries);
    Ok(())
}

// == Update Planning ==
/// Which management API flavour is being targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Hosted API: entries must be added and changed one at a time
    Public,
    /// Private installation: the whole map can be replaced in one call
    Private,
}

impl DeploymentMode {
    pub fn from_public(is_public: bool) -> Self {
        if is_public {
            DeploymentMode::Public
        } else {
            DeploymentMode::Private
        }
    }
}

/// One external call of an entry update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryCall {
    /// DELETE a single entry
    DeleteEntry(String),
    /// POST a brand-new entry to the entries collection
    AddEntry(Attribute),
    /// POST a changed value to the entry itself
    ModifyEntry(Attribute),
    /// PUT the whole map rebuilt from configuration
    ReplaceAll,
}

/// Computes the ordered calls that turn `old` entries into `new` ones.
///
/// Removed keys are always deleted individually, in key order. In public
/// mode each new or changed key then gets its own call and unchanged keys
/// get none; otherwise a single `ReplaceAll` follows.
pub fn plan_entry_update(
    old: &BTreeMap<String, String>,
    new: &BTreeMap<String, String>,
    mode: DeploymentMode,
) -> Vec<EntryCall> {
    let mut calls: Vec<EntryCall> = old
        .keys()
        .filter(|key| !new.contains_key(*key))
        .map(|key| EntryCall::DeleteEntry(key.clone()))
        .collect();

    match mode {
        DeploymentMode::Public => {
            for (key, value) in new {
                match old.get(key) {
                    Some(old_value) if old_value == value => {}
                    Some(_) => calls.push(EntryCall::ModifyEntry(Attribute::new(key, value))),
                    None => calls.push(EntryCall::AddEntry(Attribute::new(key, value))),
                }
            }
        }
        DeploymentMode::Private => calls.push(EntryCall::ReplaceAll),
    }
    calls
}

impl EntryCall {
    /// Entry key this call may put into a request path.
    pub fn addressed_key(&self) -> Option<&str> {
        match self {
            EntryCall::DeleteEntry(key) => Some(key),
            EntryCall::AddEntry(entry) | EntryCall::ModifyEntry(entry) => Some(&entry.name),
            EntryCall::ReplaceAll => None,
        }
    }
}

// == Operations ==
pub async fn create<C: ApigeeApi>(client: &C, d: &mut ResourceData) -> Result<()> {
    match post_new_kvm(client, d).await {
        Ok(id) => {
            info!("Created key-value map {}", id);
            d.set_id(id);
            Ok(())
        }
        Err(e) => {
            d.clear_id();
            Err(e)
        }
    }
}

async fn post_new_kvm<C: ApigeeApi>(client: &C, d: &ResourceData) -> Result<String> {
    let mut kvm = Kvm::new(
        d.get_required_str(ENVIRONMENT_NAME)?,
        d.get_required_str(NAME)?,
    );
    fill_kvm(&mut kvm, d)?;
    let body = serde_json::to_string(&kvm.to_body())?;

    let path = paths::environment_kvm_path(client.organization(), &kvm.environment_name);
    client
        .http_request(Method::POST, &path, &[], json_headers(), Some(body))
        .await?;
    Ok(kvm.encode_id())
}

pub async fn read<C: ApigeeApi>(client: &C, d: &mut ResourceData) -> Result<()> {
    let (env, name) = decode_id(d.id())?;
    let path = paths::environment_kvm_path_get(client.organization(), &env, &name);

    let body = match client
        .http_request(Method::GET, &path, &[], HeaderMap::new(), None)
        .await
    {
        Ok(body) => body,
        Err(e) if e.is_not_found() => {
            warn!("Key-value map {} no longer exists, removing from state", d.id());
            d.clear_id();
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    let body: KvmBody = match serde_json::from_str(&body) {
        Ok(body) => body,
        Err(e) => {
            d.clear_id();
            return Err(e.into());
        }
    };
    let kvm = Kvm::from_body(env.as_str(), body);
    let encrypted = kvm.encrypted();

    d.set(ENVIRONMENT_NAME, env);
    d.set(NAME, name);
    d.set(ENCRYPTED, encrypted);
    let entries: serde_json::Map<String, serde_json::Value> = kvm
        .entries
        .into_map()
        .into_iter()
        .map(|(k, v)| (k, serde_json::Value::String(v)))
        .collect();
    d.set(entry_attribute(encrypted), entries);
    Ok(())
}

/// Applies entry changes; every other attribute is force-new.
///
/// There is no rollback if a call fails partway. Re-running resumes: an
/// entry already deleted (404) counts as done, an add that finds the entry
/// present (409) becomes a modify, and a modify that finds it missing
/// (404) becomes an add.
pub async fn update<C: ApigeeApi>(client: &C, d: &mut ResourceData) -> Result<()> {
    let (env, name) = decode_id(d.id())?;
    let encrypted = d.get_bool(ENCRYPTED)?;
    let (old, new) = d.get_string_map_change(entry_attribute(encrypted))?;
    let mode = DeploymentMode::from_public(client.is_public());
    let org = client.organization();

    let plan = plan_entry_update(&old, &new, mode);
    // Checked before any call is made
    for key in plan.iter().filter_map(EntryCall::addressed_key) {
        validators::path_segment(key).map_err(|reason| {
            ProviderError::InvalidConfig(format!("entry '{}' of {}: {}", key, d.id(), reason))
        })?;
    }
    debug!("Updating key-value map {} with {} calls ({:?})", d.id(), plan.len(), mode);

    for call in plan {
        match call {
            EntryCall::DeleteEntry(key) => {
                let path = paths::environment_kvm_path_entries_get(org, &env, &name, &key);
                match client
                    .http_request(Method::DELETE, &path, &[], HeaderMap::new(), None)
                    .await
                {
                    Ok(_) => {}
                    Err(e) if e.is_not_found() => debug!("Entry '{}' already removed", key),
                    Err(e) => return Err(e),
                }
            }
            EntryCall::AddEntry(entry) => {
                let body = serde_json::to_string(&entry)?;
                let path = paths::environment_kvm_path_entries(org, &env, &name);
                match client
                    .http_request(Method::POST, &path, &[], json_headers(), Some(body.clone()))
                    .await
                {
                    Ok(_) => {}
                    Err(e) if e.is_conflict() => {
                        debug!("Entry '{}' already exists, modifying instead", entry.name);
                        let path =
                            paths::environment_kvm_path_entries_get(org, &env, &name, &entry.name);
                        client
                            .http_request(Method::POST, &path, &[], json_headers(), Some(body))
                            .await?;
                    }
                    Err(e) => return Err(e),
                }
            }
            EntryCall::ModifyEntry(entry) => {
                let body = serde_json::to_string(&entry)?;
                let path = paths::environment_kvm_path_entries_get(org, &env, &name, &entry.name);
                match client
                    .http_request(Method::POST, &path, &[], json_headers(), Some(body.clone()))
                    .await
                {
                    Ok(_) => {}
                    Err(e) if e.is_not_found() => {
                        debug!("Entry '{}' is missing, adding instead", entry.name);
                        let path = paths::environment_kvm_path_entries(org, &env, &name);
                        client
                            .http_request(Method::POST, &path, &[], json_headers(), Some(body))
                            .await?;
                    }
                    Err(e) => return Err(e),
                }
            }
            EntryCall::ReplaceAll => {
                let mut kvm = Kvm::new(env.as_str(), name.as_str());
                fill_kvm(&mut kvm, d)?;
                let body = serde_json::to_string(&kvm.to_body())?;
                let path = paths::environment_kvm_path_get(org, &env, &name);
                client
                    .http_request(Method::PUT, &path, &[], json_headers(), Some(body))
                    .await?;
            }
        }
    }

    info!("Updated key-value map {}", d.id());
    Ok(())
}

pub async fn delete<C: ApigeeApi>(client: &C, d: &mut ResourceData) -> Result<()> {
    let (env, name) = decode_id(d.id())?;
    let path = paths::environment_kvm_path_get(client.organization(), &env, &name);
    client
        .http_request(Method::DELETE, &path, &[], HeaderMap::new(), None)
        .await?;
    info!("Deleted key-value map {}", d.id());
    d.clear_id();
    Ok(())
}
