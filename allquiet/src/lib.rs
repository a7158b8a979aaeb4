pub mod api;
pub mod data_sources;
pub mod helpers;
pub mod resources;
pub mod validators;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::OnceLock;
use tfplug::provider::{DataSourceSchema, ProviderSchema, ResourceSchema};
use tfplug::request::{ConfigureRequest, ConfigureResponse};
use tfplug::{
    AttributeBuilder, Config, DataSourceV2, Diagnostics, ProviderV2, ResourceV2, SchemaBuilder,
    TfplugError,
};

use data_sources::{
    IntegrationDataSource, Lookup, LookupDataSource, OutboundIntegrationDataSource,
    ServiceDataSource, TeamDataSource, UserDataSource,
};
use resources::{
    AllQuietResource, IntegrationResource, MaintenanceWindowResource,
    OutboundIntegrationResource, RestResource, RoutingResource, ServiceResource,
    StatusPageResource, TeamEscalationsResource, TeamMembershipResource, TeamResource,
    UserResource,
};

pub const API_KEY_ENV: &str = "ALLQUIET_API_KEY";
pub const ENDPOINT_ENV: &str = "ALLQUIET_ENDPOINT";

pub struct AllQuietProvider {
    client: Option<api::Client>,
}

impl Default for AllQuietProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AllQuietProvider {
    pub fn new() -> Self {
        Self { client: None }
    }

    fn client(&self) -> tfplug::Result<api::Client> {
        self.client
            .clone()
            .ok_or(TfplugError::ProviderNotConfigured)
    }
}

/// Provider block value, then the environment
fn setting(config: &Config, name: &str, env: &str) -> Option<String> {
    config
        .get_string(name)
        .filter(|value| !value.is_empty())
        .or_else(|| std::env::var(env).ok().filter(|value| !value.is_empty()))
}

fn resource<R: AllQuietResource>(client: api::Client) -> Box<dyn ResourceV2> {
    Box::new(RestResource::<R>::new(client))
}

fn data_source<L: Lookup>(client: api::Client) -> Box<dyn DataSourceV2> {
    Box::new(LookupDataSource::<L>::new(client))
}

#[async_trait]
impl ProviderV2 for AllQuietProvider {
    async fn provider_schema(&self) -> ProviderSchema {
        SchemaBuilder::new()
            .description("Manages teams, on-call escalations and incident routing in AllQuiet")
            .attribute(
                "api_key",
                AttributeBuilder::string("api_key")
                    .optional()
                    .sensitive()
                    .description("AllQuiet public API key. Defaults to the ALLQUIET_API_KEY environment variable."),
            )
            .attribute(
                "endpoint",
                AttributeBuilder::string("endpoint")
                    .optional()
                    .description("Base URL of the public API. Defaults to ALLQUIET_ENDPOINT, then https://allquiet.app/api/public/v1."),
            )
            .build_data_source(0)
    }

    async fn configure(&mut self, request: ConfigureRequest) -> ConfigureResponse {
        let mut diags = Diagnostics::new();

        let endpoint = setting(&request.config, "endpoint", ENDPOINT_ENV)
            .unwrap_or_else(|| api::DEFAULT_ENDPOINT.to_string());

        match setting(&request.config, "api_key", API_KEY_ENV) {
            Some(api_key) => match api::Client::new(&endpoint, &api_key) {
                Ok(client) => {
                    tracing::info!(endpoint = %client.base_url(), "configured AllQuiet client");
                    self.client = Some(client);
                }
                Err(e) => {
                    diags.add_error("Failed to create API client", Some(e.to_string()));
                }
            },
            None => {
                diags.add_error(
                    "api_key is required",
                    Some("Set api_key in the provider block or the ALLQUIET_API_KEY environment variable"),
                );
            }
        }

        ConfigureResponse { diagnostics: diags }
    }

    async fn create_resource(&self, name: &str) -> tfplug::Result<Box<dyn ResourceV2>> {
        let client = self.client()?;

        match name {
            TeamResource::TYPE_NAME => Ok(resource::<TeamResource>(client)),
            UserResource::TYPE_NAME => Ok(resource::<UserResource>(client)),
            TeamMembershipResource::TYPE_NAME => Ok(resource::<TeamMembershipResource>(client)),
            TeamEscalationsResource::TYPE_NAME => Ok(resource::<TeamEscalationsResource>(client)),
            IntegrationResource::TYPE_NAME => Ok(resource::<IntegrationResource>(client)),
            OutboundIntegrationResource::TYPE_NAME => {
                Ok(resource::<OutboundIntegrationResource>(client))
            }
            RoutingResource::TYPE_NAME => Ok(resource::<RoutingResource>(client)),
            MaintenanceWindowResource::TYPE_NAME => {
                Ok(resource::<MaintenanceWindowResource>(client))
            }
            ServiceResource::TYPE_NAME => Ok(resource::<ServiceResource>(client)),
            StatusPageResource::TYPE_NAME => Ok(resource::<StatusPageResource>(client)),
            _ => Err(TfplugError::ResourceNotFound(name.to_string())),
        }
    }

    async fn create_data_source(&self, name: &str) -> tfplug::Result<Box<dyn DataSourceV2>> {
        let client = self.client()?;

        match name {
            TeamDataSource::TYPE_NAME => Ok(data_source::<TeamDataSource>(client)),
            UserDataSource::TYPE_NAME => Ok(data_source::<UserDataSource>(client)),
            IntegrationDataSource::TYPE_NAME => Ok(data_source::<IntegrationDataSource>(client)),
            OutboundIntegrationDataSource::TYPE_NAME => {
                Ok(data_source::<OutboundIntegrationDataSource>(client))
            }
            ServiceDataSource::TYPE_NAME => Ok(data_source::<ServiceDataSource>(client)),
            _ => Err(TfplugError::DataSourceNotFound(name.to_string())),
        }
    }

    async fn resource_schemas(&self) -> HashMap<String, ResourceSchema> {
        static SCHEMAS: OnceLock<HashMap<String, ResourceSchema>> = OnceLock::new();

        SCHEMAS
            .get_or_init(|| {
                [
                    (TeamResource::TYPE_NAME, TeamResource::schema_static()),
                    (UserResource::TYPE_NAME, UserResource::schema_static()),
                    (
                        TeamMembershipResource::TYPE_NAME,
                        TeamMembershipResource::schema_static(),
                    ),
                    (
                        TeamEscalationsResource::TYPE_NAME,
                        TeamEscalationsResource::schema_static(),
                    ),
                    (
                        IntegrationResource::TYPE_NAME,
                        IntegrationResource::schema_static(),
                    ),
                    (
                        OutboundIntegrationResource::TYPE_NAME,
                        OutboundIntegrationResource::schema_static(),
                    ),
                    (RoutingResource::TYPE_NAME, RoutingResource::schema_static()),
                    (
                        MaintenanceWindowResource::TYPE_NAME,
                        MaintenanceWindowResource::schema_static(),
                    ),
                    (ServiceResource::TYPE_NAME, ServiceResource::schema_static()),
                    (
                        StatusPageResource::TYPE_NAME,
                        StatusPageResource::schema_static(),
                    ),
                ]
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect()
            })
            .clone()
    }

    async fn data_source_schemas(&self) -> HashMap<String, DataSourceSchema> {
        static SCHEMAS: OnceLock<HashMap<String, DataSourceSchema>> = OnceLock::new();

        SCHEMAS
            .get_or_init(|| {
                [
                    (TeamDataSource::TYPE_NAME, TeamDataSource::schema_static()),
                    (UserDataSource::TYPE_NAME, UserDataSource::schema_static()),
                    (
                        IntegrationDataSource::TYPE_NAME,
                        IntegrationDataSource::schema_static(),
                    ),
                    (
                        OutboundIntegrationDataSource::TYPE_NAME,
                        OutboundIntegrationDataSource::schema_static(),
                    ),
                    (ServiceDataSource::TYPE_NAME, ServiceDataSource::schema_static()),
                ]
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect()
            })
            .clone()
    }

    async fn validate_resource_config(&self, type_name: &str, config: &Config) -> Diagnostics {
        match type_name {
            MaintenanceWindowResource::TYPE_NAME => {
                resources::maintenance_window::validate_window(config)
            }
            _ => Diagnostics::new(),
        }
    }
}
