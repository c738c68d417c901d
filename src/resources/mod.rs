//! Resources Module
//!
//! CRUD handlers for each managed resource type, plus the lifecycle
//! driver that decides between create, update and replacement.
//!
//! # Resources
//! - `apigee_cache` - environment cache
//! - `apigee_environment_kvm` - environment key-value map

pub mod cache;
pub mod kvm;

#[cfg(test)]
pub(crate) mod testing;

use tracing::{debug, info};

use crate::client::ApigeeApi;
use crate::error::{ProviderError, Result};
use crate::models::decode_id;
use crate::schema::{ResourceData, ResourceSchema};

// == Shared Attribute Names ==
pub const ENVIRONMENT_NAME: &str = "environment_name";
pub const NAME: &str = "name";

/// Resource types this provider manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Cache,
    EnvironmentKvm,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Cache, ResourceKind::EnvironmentKvm];

    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::Cache => "apigee_cache",
            ResourceKind::EnvironmentKvm => "apigee_environment_kvm",
        }
    }

    /// Accepts the full type name or the name without the `apigee_` prefix.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("apigee_").unwrap_or(name);
        Self::ALL
            .into_iter()
            .find(|kind| kind.type_name().strip_prefix("apigee_") == Some(name))
    }

    pub fn schema(&self) -> ResourceSchema {
        match self {
            ResourceKind::Cache => cache::schema(),
            ResourceKind::EnvironmentKvm => kvm::schema(),
        }
    }

    // == Operations ==
    pub async fn create<C: ApigeeApi>(&self, client: &C, data: &mut ResourceData) -> Result<()> {
        if let Err(e) = self.schema().validate(data) {
            data.clear_id();
            return Err(e);
        }
        match self {
            ResourceKind::Cache => cache::create(client, data).await,
            ResourceKind::EnvironmentKvm => kvm::create(client, data).await,
        }
    }

    pub async fn read<C: ApigeeApi>(&self, client: &C, data: &mut ResourceData) -> Result<()> {
        match self {
            ResourceKind::Cache => cache::read(client, data).await,
            ResourceKind::EnvironmentKvm => kvm::read(client, data).await,
        }
    }

    pub async fn update<C: ApigeeApi>(&self, client: &C, data: &mut ResourceData) -> Result<()> {
        self.schema().validate(data)?;
        match self {
            ResourceKind::Cache => cache::update(client, data).await,
            ResourceKind::EnvironmentKvm => kvm::update(client, data).await,
        }
    }

    pub async fn delete<C: ApigeeApi>(&self, client: &C, data: &mut ResourceData) -> Result<()> {
        match self {
            ResourceKind::Cache => cache::delete(client, data).await,
            ResourceKind::EnvironmentKvm => kvm::delete(client, data).await,
        }
    }

    // == Lifecycle ==
    /// Brings the remote object in line with the current attributes.
    ///
    /// Creates when there is no identity, replaces (delete then create) when
    /// a force-new attribute changed, updates when anything else changed,
    /// and finally refreshes the attributes with a read.
    pub async fn apply<C: ApigeeApi>(&self, client: &C, data: &mut ResourceData) -> Result<()> {
        let schema = self.schema();
        schema.validate(data)?;

        if !data.has_id() {
            self.create(client, data).await?;
        } else {
            let reasons = schema.replacement_reasons(data);
            if !reasons.is_empty() {
                info!(
                    "{} {} must be replaced, changed: {}",
                    self.type_name(),
                    data.id(),
                    reasons.join(", ")
                );
                self.delete(client, data).await?;
                self.create(client, data).await?;
            } else if schema.has_changes(data) {
                self.update(client, data).await?;
            } else {
                debug!("{} {} is up to date", self.type_name(), data.id());
            }
        }

        self.read(client, data).await
    }

    /// Adopts an existing remote object by its identifier.
    pub async fn import<C: ApigeeApi>(&self, client: &C, id: &str) -> Result<ResourceData> {
        decode_id(id)?;
        let mut data = ResourceData::with_id(id);
        self.read(client, &mut data).await?;
        if !data.has_id() {
            return Err(ProviderError::NotFound(format!(
                "{} '{}' does not exist",
                self.type_name(),
                id
            )));
        }
        data.commit();
        info!("Imported {} {}", self.type_name(), id);
        Ok(data)
    }
}
