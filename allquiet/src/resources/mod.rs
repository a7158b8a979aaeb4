//! Resource implementations
//!
//! Every AllQuiet resource is a REST collection with the same lifecycle, so
//! the lifecycle lives in [`RestResource`]. Each module only describes its
//! schema and the mapping between Terraform state and the wire types.

pub mod integration;
pub mod maintenance_window;
pub mod outbound_integration;
pub mod routing;
pub mod service;
pub mod status_page;
pub mod team;
pub mod team_escalations;
pub mod team_membership;
pub mod user;

pub use integration::IntegrationResource;
pub use maintenance_window::MaintenanceWindowResource;
pub use outbound_integration::OutboundIntegrationResource;
pub use routing::RoutingResource;
pub use service::ServiceResource;
pub use status_page::StatusPageResource;
pub use team::TeamResource;
pub use team_escalations::TeamEscalationsResource;
pub use team_membership::TeamMembershipResource;
pub use user::UserResource;

use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::request::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse,
    ResourceSchemaResponse, SchemaRequest, UpdateRequest, UpdateResponse,
};
use tfplug::{AttributeBuilder, Context, Diagnostics, ResourceSchema, ResourceV2, State};

use crate::api::{ApiError, ApiResource, Client};

/// Schema and state mapping of one AllQuiet resource type
pub trait AllQuietResource: Send + Sync + 'static {
    type Api: ApiResource;

    const TYPE_NAME: &'static str;
    /// Used in diagnostics, e.g. "team membership"
    const DISPLAY_NAME: &'static str;

    fn schema_static() -> ResourceSchema;

    fn map_request(plan: &State) -> <Self::Api as ApiResource>::Request;

    fn map_response_to_state(response: &Self::Api) -> State;
}

/// CRUD lifecycle shared by all resources
pub struct RestResource<R> {
    client: Client,
    _resource: PhantomData<fn() -> R>,
}

impl<R: AllQuietResource> RestResource<R> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }
}

/// The computed `id` attribute every resource carries
pub fn id_attribute() -> AttributeBuilder {
    AttributeBuilder::string("id")
        .computed()
        .description("Identifier assigned by AllQuiet")
        .plan_modifier(Box::new(UseStateForUnknown))
}

/// Resolves once the request context is cancelled
async fn cancelled(context: &Context) {
    let mut done = context.done();
    loop {
        if *done.borrow_and_update() {
            return;
        }
        if done.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Runs an API call, abandoning it when Terraform stops the provider
pub(crate) async fn cancellable<T>(
    context: &Context,
    operation: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    tokio::select! {
        result = operation => result,
        _ = cancelled(context) => Err(ApiError::Cancelled),
    }
}

fn state_id(state: &State) -> Option<String> {
    state.get_string("id").filter(|id| !id.is_empty())
}

#[async_trait]
impl<R: AllQuietResource> ResourceV2 for RestResource<R> {
    async fn schema(&self, _request: SchemaRequest) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: R::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn create(&self, request: CreateRequest) -> CreateResponse {
        let mut diagnostics = Diagnostics::new();
        let body = R::map_request(&request.planned_state);

        tracing::debug!(resource = R::TYPE_NAME, "creating");
        let api = self.client.api::<R::Api>();
        match cancellable(&request.context, api.create(&body)).await {
            Ok(created) => {
                tracing::info!(resource = R::TYPE_NAME, id = created.id(), "created");
                CreateResponse {
                    state: R::map_response_to_state(&created),
                    diagnostics,
                }
            }
            Err(e) => {
                tracing::error!(resource = R::TYPE_NAME, error = %e, "create failed");
                diagnostics.add_error(
                    format!("Failed to create {}", R::DISPLAY_NAME),
                    Some(e.to_string()),
                );
                CreateResponse {
                    state: request.planned_state,
                    diagnostics,
                }
            }
        }
    }

    async fn read(&self, request: ReadRequest) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();
        let Some(id) = state_id(&request.current_state) else {
            diagnostics.add_error(
                format!("Failed to read {}", R::DISPLAY_NAME),
                Some("The state has no id"),
            );
            return ReadResponse {
                state: Some(request.current_state),
                diagnostics,
            };
        };

        tracing::debug!(resource = R::TYPE_NAME, id = %id, "reading");
        let api = self.client.api::<R::Api>();
        match cancellable(&request.context, api.get(&id)).await {
            Ok(Some(found)) => ReadResponse {
                state: Some(R::map_response_to_state(&found)),
                diagnostics,
            },
            Ok(None) => {
                tracing::warn!(
                    resource = R::TYPE_NAME,
                    id = %id,
                    "no longer exists, removing from state"
                );
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                tracing::error!(resource = R::TYPE_NAME, id = %id, error = %e, "read failed");
                diagnostics.add_error(
                    format!("Failed to read {} {}", R::DISPLAY_NAME, id),
                    Some(e.to_string()),
                );
                ReadResponse {
                    state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(&self, request: UpdateRequest) -> UpdateResponse {
        let mut diagnostics = Diagnostics::new();
        let Some(id) = state_id(&request.current_state) else {
            diagnostics.add_error(
                format!("Failed to update {}", R::DISPLAY_NAME),
                Some("The prior state has no id"),
            );
            return UpdateResponse {
                state: request.current_state,
                diagnostics,
            };
        };

        let body = R::map_request(&request.planned_state);
        tracing::debug!(resource = R::TYPE_NAME, id = %id, "updating");
        let api = self.client.api::<R::Api>();
        match cancellable(&request.context, api.update(&id, &body)).await {
            Ok(updated) => UpdateResponse {
                state: R::map_response_to_state(&updated),
                diagnostics,
            },
            Err(e) => {
                tracing::error!(resource = R::TYPE_NAME, id = %id, error = %e, "update failed");
                diagnostics.add_error(
                    format!("Failed to update {} {}", R::DISPLAY_NAME, id),
                    Some(e.to_string()),
                );
                UpdateResponse {
                    state: request.current_state,
                    diagnostics,
                }
            }
        }
    }

    async fn delete(&self, request: DeleteRequest) -> DeleteResponse {
        let mut diagnostics = Diagnostics::new();
        let Some(id) = state_id(&request.current_state) else {
            // Nothing was ever created remotely
            return DeleteResponse { diagnostics };
        };

        tracing::debug!(resource = R::TYPE_NAME, id = %id, "deleting");
        let api = self.client.api::<R::Api>();
        match cancellable(&request.context, api.delete(&id)).await {
            Ok(()) => {}
            Err(ApiError::NotFound) => {
                tracing::warn!(resource = R::TYPE_NAME, id = %id, "already deleted");
            }
            Err(e) => {
                tracing::error!(resource = R::TYPE_NAME, id = %id, error = %e, "delete failed");
                diagnostics.add_error(
                    format!("Failed to delete {} {}", R::DISPLAY_NAME, id),
                    Some(e.to_string()),
                );
            }
        }
        DeleteResponse { diagnostics }
    }
}
