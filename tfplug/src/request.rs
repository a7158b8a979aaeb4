use crate::context::Context;
use crate::provider::{DataSourceSchema, ResourceSchema};
use crate::types::{Config, Diagnostics, State};

#[derive(Clone)]
pub struct ConfigureRequest {
    pub context: Context,
    pub config: Config,
}

#[derive(Clone)]
pub struct ConfigureResponse {
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct SchemaRequest {
    pub context: Context,
}

pub struct ResourceSchemaResponse {
    pub schema: ResourceSchema,
    pub diagnostics: Diagnostics,
}

pub struct DataSourceSchemaResponse {
    pub schema: DataSourceSchema,
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct CreateRequest {
    pub context: Context,
    pub config: Config,
    pub planned_state: State,
}

#[derive(Clone)]
pub struct CreateResponse {
    pub state: State,
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct ReadRequest {
    pub context: Context,
    pub current_state: State,
}

#[derive(Clone)]
pub struct ReadResponse {
    pub state: Option<State>,
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct UpdateRequest {
    pub context: Context,
    pub config: Config,
    pub planned_state: State,
    pub current_state: State,
}

#[derive(Clone)]
pub struct UpdateResponse {
    pub state: State,
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct DeleteRequest {
    pub context: Context,
    pub current_state: State,
}

#[derive(Clone)]
pub struct DeleteResponse {
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct ImportStateRequest {
    pub context: Context,
    pub type_name: String,
    pub id: String,
}

#[derive(Clone)]
pub struct ImportStateResponse {
    pub state: Option<State>,
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct ReadDataSourceRequest {
    pub context: Context,
    pub config: Config,
}

#[derive(Clone)]
pub struct ReadDataSourceResponse {
    pub state: Option<State>,
    pub diagnostics: Diagnostics,
}
