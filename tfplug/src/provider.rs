//! Provider, resource and data source traits
//!
//! Providers are factories: the gRPC layer asks for a fresh resource or data
//! source instance per call, after the provider has been configured. Schemas
//! are requested separately so they can be served before configuration.

use crate::request::{
    ConfigureRequest, ConfigureResponse, CreateRequest, CreateResponse, DataSourceSchemaResponse,
    DeleteRequest, DeleteResponse, ImportStateRequest, ImportStateResponse, ReadDataSourceRequest,
    ReadDataSourceResponse, ReadRequest, ReadResponse, ResourceSchemaResponse, SchemaRequest,
    UpdateRequest, UpdateResponse,
};
use crate::schema::Attribute;
use crate::types::{Config, Diagnostics};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait ProviderV2: Send + Sync {
    /// Schema of the provider configuration block
    async fn provider_schema(&self) -> ProviderSchema;

    async fn configure(&mut self, request: ConfigureRequest) -> ConfigureResponse;

    async fn create_resource(&self, name: &str) -> Result<Box<dyn ResourceV2>>;

    async fn create_data_source(&self, name: &str) -> Result<Box<dyn DataSourceV2>>;

    async fn resource_schemas(&self) -> HashMap<String, ResourceSchema>;

    async fn data_source_schemas(&self) -> HashMap<String, DataSourceSchema>;

    /// Cross-attribute checks on a resource configuration. Runs before the
    /// provider is configured, so implementations must not call remote APIs.
    async fn validate_resource_config(&self, _type_name: &str, _config: &Config) -> Diagnostics {
        Diagnostics::new()
    }
}

#[async_trait]
pub trait ResourceV2: Send + Sync {
    async fn schema(&self, request: SchemaRequest) -> ResourceSchemaResponse;

    /// MUST populate every schema attribute in the returned state, computed
    /// ones included
    async fn create(&self, request: CreateRequest) -> CreateResponse;

    /// Returns `None` when the remote object no longer exists
    async fn read(&self, request: ReadRequest) -> ReadResponse;

    async fn update(&self, request: UpdateRequest) -> UpdateResponse;

    async fn delete(&self, request: DeleteRequest) -> DeleteResponse;

    /// Builds the partial state Terraform refreshes with `read` after import
    async fn import_state(&self, request: ImportStateRequest) -> ImportStateResponse {
        crate::import::import_state_passthrough_id("id", request)
    }
}

#[async_trait]
pub trait DataSourceV2: Send + Sync {
    async fn schema(&self, request: SchemaRequest) -> DataSourceSchemaResponse;

    async fn read(&self, request: ReadDataSourceRequest) -> ReadDataSourceResponse;
}

#[derive(Debug, Clone)]
pub struct DataSourceSchema {
    pub version: i64,
    pub description: String,
    pub attributes: HashMap<String, Attribute>,
}

#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub version: i64,
    pub description: String,
    pub attributes: HashMap<String, Attribute>,
}

/// The provider block has the same shape as a data source schema
pub type ProviderSchema = DataSourceSchema;
