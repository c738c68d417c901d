//! Cache resource (`apigee_cache`)
//!
//! Translates between cache attributes and the caches endpoints of one
//! environment.

use reqwest::header::HeaderMap;
use reqwest::Method;
use tracing::{info, warn};

use super::{ENVIRONMENT_NAME, NAME};
use crate::client::{json_headers, paths, ApigeeApi};
use crate::error::Result;
use crate::models::{decode_id, Cache, CacheBody, Expiry};
use crate::schema::{validators, AttributeSchema, ResourceData, ResourceSchema, ValueType};

// == Attribute Names ==
pub const DESCRIPTION: &str = "description";
pub const EXPIRY_TIMEOUT_IN_SEC: &str = "expiry_timeout_in_sec";
pub const EXPIRY_TIME_OF_DAY: &str = "expiry_time_of_day";
pub const EXPIRY_DATE: &str = "expiry_date";
pub const SKIP_CACHE_IF_ELEMENT_SIZE_IN_KB_EXCEEDS: &str = "skip_cache_if_element_size_in_kb_exceeds";

pub fn schema() -> ResourceSchema {
    ResourceSchema {
        type_name: "apigee_cache",
        attributes: vec![
            AttributeSchema::required(ENVIRONMENT_NAME, ValueType::String)
                .force_new()
                .validate(validators::path_segment),
            AttributeSchema::required(NAME, ValueType::String)
                .force_new()
                .validate(validators::path_segment),
            AttributeSchema::optional(DESCRIPTION, ValueType::String),
            AttributeSchema::optional(EXPIRY_TIMEOUT_IN_SEC, ValueType::String)
                .conflicts_with(&[EXPIRY_TIME_OF_DAY, EXPIRY_DATE])
                .validate(validators::non_negative_integer),
            AttributeSchema::optional(EXPIRY_TIME_OF_DAY, ValueType::String)
                .conflicts_with(&[EXPIRY_TIMEOUT_IN_SEC, EXPIRY_DATE])
                .validate(validators::time_of_day),
            AttributeSchema::optional(EXPIRY_DATE, ValueType::String)
                .conflicts_with(&[EXPIRY_TIMEOUT_IN_SEC, EXPIRY_TIME_OF_DAY])
                .validate(validators::expiry_date),
            AttributeSchema::optional(SKIP_CACHE_IF_ELEMENT_SIZE_IN_KB_EXCEEDS, ValueType::Int),
        ],
    }
}

/// Attribute that surfaces the given expiry policy.
pub fn expiry_attribute(expiry: &Expiry) -> &'static str {
    match expiry {
        Expiry::TimeoutInSec(_) => EXPIRY_TIMEOUT_IN_SEC,
        Expiry::TimeOfDay(_) => EXPIRY_TIME_OF_DAY,
        Expiry::ExpiryDate(_) => EXPIRY_DATE,
    }
}

/// Copies the mutable attributes into `cache`.
pub fn fill_cache(cache: &mut Cache, d: &ResourceData) -> Result<()> {
    if let Some(description) = d.get_str(DESCRIPTION)? {
        cache.description = description;
    }

    cache.expiry = if let Some(v) = d.get_str(EXPIRY_TIMEOUT_IN_SEC)? {
        Some(Expiry::TimeoutInSec(v))
    } else if let Some(v) = d.get_str(EXPIRY_TIME_OF_DAY)? {
        Some(Expiry::TimeOfDay(v))
    } else {
        d.get_str(EXPIRY_DATE)?.map(Expiry::ExpiryDate)
    };

    if let Some(kb) = d.get_int(SKIP_CACHE_IF_ELEMENT_SIZE_IN_KB_EXCEEDS)? {
        cache.skip_cache_if_element_size_in_kb_exceeds = Some(kb);
    }
    Ok(())
}

pub async fn create<C: ApigeeApi>(client: &C, d: &mut ResourceData) -> Result<()> {
    match post_new_cache(client, d).await {
        Ok(id) => {
            info!("Created cache {}", id);
            d.set_id(id);
            Ok(())
        }
        Err(e) => {
            d.clear_id();
            Err(e)
        }
    }
}

async fn post_new_cache<C: ApigeeApi>(client: &C, d: &ResourceData) -> Result<String> {
    let mut cache = Cache::new(
        d.get_required_str(ENVIRONMENT_NAME)?,
        d.get_required_str(NAME)?,
    );
    fill_cache(&mut cache, d)?;
    let body = serde_json::to_string(&cache.to_body())?;

    let path = paths::cache_path(client.organization(), &cache.environment_name);
    client
        .http_request(Method::POST, &path, &[], json_headers(), Some(body))
        .await?;
    Ok(cache.encode_id())
}

pub async fn read<C: ApigeeApi>(client: &C, d: &mut ResourceData) -> Result<()> {
    let (env, name) = decode_id(d.id())?;
    let path = paths::cache_path_get(client.organization(), &env, &name);

    let body = match client
        .http_request(Method::GET, &path, &[], HeaderMap::new(), None)
        .await
    {
        Ok(body) => body,
        Err(e) if e.is_not_found() => {
            warn!("Cache {} no longer exists, removing from state", d.id());
            d.clear_id();
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    let body: CacheBody = match serde_json::from_str(&body) {
        Ok(body) => body,
        Err(e) => {
            d.clear_id();
            return Err(e.into());
        }
    };
    let cache = Cache::from_body(env.as_str(), body);

    d.set(ENVIRONMENT_NAME, env);
    d.set(NAME, name);
    if cache.description.is_empty() {
        d.remove(DESCRIPTION);
    } else {
        d.set(DESCRIPTION, cache.description);
    }

    // Only the effective policy survives a read
    let selected = cache.expiry.as_ref().map(expiry_attribute);
    for attribute in [EXPIRY_TIMEOUT_IN_SEC, EXPIRY_TIME_OF_DAY, EXPIRY_DATE] {
        if selected != Some(attribute) {
            d.remove(attribute);
        }
    }
    if let Some(expiry) = &cache.expiry {
        d.set(expiry_attribute(expiry), expiry.value());
    }

    match cache.skip_cache_if_element_size_in_kb_exceeds {
        Some(kb) => d.set(SKIP_CACHE_IF_ELEMENT_SIZE_IN_KB_EXCEEDS, kb),
        None => d.remove(SKIP_CACHE_IF_ELEMENT_SIZE_IN_KB_EXCEEDS),
    }
    Ok(())
}

/// Environment and name are force-new, so only the body changes here.
pub async fn update<C: ApigeeApi>(client: &C, d: &mut ResourceData) -> Result<()> {
    let (env, name) = decode_id(d.id())?;
    let mut cache = Cache::new(env, name);
    fill_cache(&mut cache, d)?;
    let body = serde_json::to_string(&cache.to_body())?;

    let path = paths::cache_path_get(client.organization(), &cache.environment_name, &cache.name);
    client
        .http_request(Method::PUT, &path, &[], json_headers(), Some(body))
        .await?;
    info!("Updated cache {}", d.id());
    Ok(())
}

pub async fn delete<C: ApigeeApi>(client: &C, d: &mut ResourceData) -> Result<()> {
    let (env, name) = decode_id(d.id())?;
    let path = paths::cache_path_get(client.organization(), &env, &name);
    client
        .http_request(Method::DELETE, &path, &[], HeaderMap::new(), None)
        .await?;
    info!("Deleted cache {}", d.id());
    d.clear_id();
    Ok(())
}
