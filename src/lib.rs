//! Apigee Provider - declarative management of Apigee environment resources
//!
//! Maps resource attributes onto the Apigee management API for caches and
//! environment key-value maps.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod resources;
pub mod schema;

pub use client::{ApigeeApi, ApigeeClient};
pub use config::Config;
pub use error::{ProviderError, Result};
pub use resources::ResourceKind;
pub use schema::ResourceData;
