//! Data source implementations
//!
//! Each data source looks up exactly one existing object by a natural key
//! such as a display name. Zero or several matches are errors.

pub mod integration;
pub mod outbound_integration;
pub mod service;
pub mod team;
pub mod user;

pub use integration::IntegrationDataSource;
pub use outbound_integration::OutboundIntegrationDataSource;
pub use service::ServiceDataSource;
pub use team::TeamDataSource;
pub use user::UserDataSource;

use async_trait::async_trait;
use std::marker::PhantomData;
use tfplug::request::{
    DataSourceSchemaResponse, ReadDataSourceRequest, ReadDataSourceResponse, SchemaRequest,
};
use tfplug::{Config, DataSourceSchema, DataSourceV2, Diagnostics, State};

use crate::api::{ApiError, ApiQueryParams, ApiResource, Client};
use crate::resources::cancellable;

/// Schema and search of one AllQuiet data source
pub trait Lookup: Send + Sync + 'static {
    type Api: ApiResource;

    const TYPE_NAME: &'static str;
    const DISPLAY_NAME: &'static str;

    fn schema_static() -> DataSourceSchema;

    /// Narrows the server side search
    fn query(config: &Config) -> ApiQueryParams;

    /// The search criteria, for diagnostics
    fn describe(config: &Config) -> String;

    /// Exact match on the candidates the API returned
    fn matches(candidate: &Self::Api, config: &Config) -> bool;

    fn to_state(found: &Self::Api, config: &Config) -> State;
}

pub struct LookupDataSource<L> {
    client: Client,
    _lookup: PhantomData<fn() -> L>,
}

impl<L: Lookup> LookupDataSource<L> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _lookup: PhantomData,
        }
    }

    async fn find(&self, config: &Config) -> Result<Vec<L::Api>, ApiError> {
        let candidates = self
            .client
            .api::<L::Api>()
            .find(&L::query(config))
            .await?;
        Ok(candidates
            .into_iter()
            .filter(|candidate| L::matches(candidate, config))
            .collect())
    }
}

#[async_trait]
impl<L: Lookup> DataSourceV2 for LookupDataSource<L> {
    async fn schema(&self, _request: SchemaRequest) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: L::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn read(&self, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = Diagnostics::new();
        let criteria = L::describe(&request.config);
        tracing::debug!(data_source = L::TYPE_NAME, criteria = %criteria, "looking up");

        let lookup = self.find(&request.config);
        let found = match cancellable(&request.context, lookup).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!(data_source = L::TYPE_NAME, error = %e, "lookup failed");
                diagnostics.add_error(
                    format!("Failed to look up {}", L::DISPLAY_NAME),
                    Some(e.to_string()),
                );
                return ReadDataSourceResponse {
                    state: None,
                    diagnostics,
                };
            }
        };

        let state = match found.as_slice() {
            [single] => Some(L::to_state(single, &request.config)),
            [] => {
                diagnostics.add_error(
                    format!("{} not found", L::DISPLAY_NAME),
                    Some(format!("No {} with {} exists", L::DISPLAY_NAME, criteria)),
                );
                None
            }
            many => {
                let ids: Vec<&str> = many.iter().map(|candidate| candidate.id()).collect();
                diagnostics.add_error(
                    format!("{} lookup is ambiguous", L::DISPLAY_NAME),
                    Some(format!(
                        "{} objects match {}: {}",
                        many.len(),
                        criteria,
                        ids.join(", ")
                    )),
                );
                None
            }
        };

        ReadDataSourceResponse { state, diagnostics }
    }
}
