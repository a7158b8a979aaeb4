//! gRPC service implementation for ProviderV2
//!
//! This module implements the Terraform Plugin Protocol v6 on top of the
//! factory-based ProviderV2 architecture: resources and data sources are
//! created on demand for every call, schemas are served from the provider's
//! cache and all values travel as msgpack encoded [`Dynamic`] trees.

use crate::context::Context;
use crate::defaults::DefaultRequest;
use crate::plan_modifier::{values_equal, PlanModifyRequest};
use crate::proto::tfplugin6::{
    attribute_path::{step::Selector, Step},
    provider_server::{Provider as ProtoProvider, ProviderServer as ProtoProviderServer},
    *,
};
use crate::provider::ProviderV2;
use crate::request::{
    ConfigureRequest, CreateRequest, DeleteRequest, ImportStateRequest, ReadDataSourceRequest,
    ReadRequest, UpdateRequest,
};
use crate::schema::{Attribute, NestingMode};
use crate::types::{
    AttributePath as TfplugAttributePath, AttributePathStep, Config, Diagnostics as TfplugDiagnostics,
    Dynamic, State,
};
use rmp_serde::{decode, encode};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Request, Response, Status};

type Values = HashMap<String, Dynamic>;

/// Wraps a provider so it can be mounted on a tonic server
pub struct ProviderServer<P: ProviderV2> {
    provider: Arc<RwLock<P>>,
}

impl<P: ProviderV2 + 'static> ProviderServer<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(RwLock::new(provider)),
        }
    }

    pub fn into_service(self, max_message_size: usize) -> ProtoProviderServer<ProviderService<P>> {
        ProtoProviderServer::new(ProviderService::new(self.provider))
            .max_decoding_message_size(max_message_size)
            .max_encoding_message_size(max_message_size)
    }
}

pub struct ProviderService<P: ProviderV2> {
    provider: Arc<RwLock<P>>,
    /// Cancelled by StopProvider; every request context is derived from it
    stop: Context,
}

impl<P: ProviderV2 + 'static> ProviderService<P> {
    fn new(provider: Arc<RwLock<P>>) -> Self {
        Self {
            provider,
            stop: Context::new(),
        }
    }
}

#[tonic::async_trait]
impl<P: ProviderV2 + 'static> ProtoProvider for ProviderService<P> {
    async fn get_metadata(
        &self,
        _request: Request<get_metadata::Request>,
    ) -> std::result::Result<Response<get_metadata::Response>, Status> {
        let provider = self.provider.read().await;

        let mut resources: Vec<String> = provider.resource_schemas().await.into_keys().collect();
        resources.sort();
        let mut data_sources: Vec<String> =
            provider.data_source_schemas().await.into_keys().collect();
        data_sources.sort();

        Ok(Response::new(get_metadata::Response {
            server_capabilities: Some(server_capabilities()),
            diagnostics: vec![],
            data_sources: data_sources
                .into_iter()
                .map(|type_name| get_metadata::DataSourceMetadata { type_name })
                .collect(),
            resources: resources
                .into_iter()
                .map(|type_name| get_metadata::ResourceMetadata { type_name })
                .collect(),
        }))
    }

    async fn get_provider_schema(
        &self,
        _request: Request<get_provider_schema::Request>,
    ) -> std::result::Result<Response<get_provider_schema::Response>, Status> {
        let provider = self.provider.read().await;
        let provider_schema = provider.provider_schema().await;
        let resource_schemas = provider.resource_schemas().await;
        let data_source_schemas = provider.data_source_schemas().await;

        let resources = resource_schemas
            .iter()
            .map(|(name, schema)| {
                (
                    name.clone(),
                    to_proto_schema(schema.version, &schema.description, &schema.attributes),
                )
            })
            .collect();

        let data_sources = data_source_schemas
            .iter()
            .map(|(name, schema)| {
                (
                    name.clone(),
                    to_proto_schema(schema.version, &schema.description, &schema.attributes),
                )
            })
            .collect();

        Ok(Response::new(get_provider_schema::Response {
            provider: Some(to_proto_schema(
                provider_schema.version,
                &provider_schema.description,
                &provider_schema.attributes,
            )),
            resource_schemas: resources,
            data_source_schemas: data_sources,
            diagnostics: vec![],
            provider_meta: None,
            server_capabilities: Some(server_capabilities()),
        }))
    }

    async fn validate_provider_config(
        &self,
        request: Request<validate_provider_config::Request>,
    ) -> std::result::Result<Response<validate_provider_config::Response>, Status> {
        let req = request.into_inner();
        let config = decode_object(&req.config)?.unwrap_or_default();

        let provider = self.provider.read().await;
        let schema = provider.provider_schema().await;

        let mut diagnostics = TfplugDiagnostics::new();
        validate_object(
            &config,
            &schema.attributes,
            &TfplugAttributePath::root(),
            &mut diagnostics,
        );

        Ok(Response::new(validate_provider_config::Response {
            diagnostics: convert_diagnostics(diagnostics),
        }))
    }

    async fn validate_resource_config(
        &self,
        request: Request<validate_resource_config::Request>,
    ) -> std::result::Result<Response<validate_resource_config::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let provider = self.provider.read().await;
        let schemas = provider.resource_schemas().await;
        let Some(schema) = schemas.get(&type_name) else {
            return Ok(Response::new(validate_resource_config::Response {
                diagnostics: unknown_type_diagnostics("resource", &type_name),
            }));
        };

        let config = decode_object(&req.config)?.unwrap_or_default();

        let mut diagnostics = TfplugDiagnostics::new();
        validate_object(
            &config,
            &schema.attributes,
            &TfplugAttributePath::root(),
            &mut diagnostics,
        );

        if !diagnostics.has_errors() {
            let config = Config::from(conform_object(config, &schema.attributes));
            diagnostics.extend(provider.validate_resource_config(&type_name, &config).await);
        }

        Ok(Response::new(validate_resource_config::Response {
            diagnostics: convert_diagnostics(diagnostics),
        }))
    }

    async fn validate_data_resource_config(
        &self,
        request: Request<validate_data_resource_config::Request>,
    ) -> std::result::Result<Response<validate_data_resource_config::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let provider = self.provider.read().await;
        let schemas = provider.data_source_schemas().await;
        let Some(schema) = schemas.get(&type_name) else {
            return Ok(Response::new(validate_data_resource_config::Response {
                diagnostics: unknown_type_diagnostics("data source", &type_name),
            }));
        };

        let config = decode_object(&req.config)?.unwrap_or_default();

        let mut diagnostics = TfplugDiagnostics::new();
        validate_object(
            &config,
            &schema.attributes,
            &TfplugAttributePath::root(),
            &mut diagnostics,
        );

        Ok(Response::new(validate_data_resource_config::Response {
            diagnostics: convert_diagnostics(diagnostics),
        }))
    }

    async fn upgrade_resource_state(
        &self,
        request: Request<upgrade_resource_state::Request>,
    ) -> std::result::Result<Response<upgrade_resource_state::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let provider = self.provider.read().await;
        let schemas = provider.resource_schemas().await;
        let Some(schema) = schemas.get(&type_name) else {
            return Ok(Response::new(upgrade_resource_state::Response {
                upgraded_state: None,
                diagnostics: unknown_type_diagnostics("resource", &type_name),
            }));
        };

        let json = req.raw_state.map(|raw| raw.json).unwrap_or_default();
        if json.is_empty() {
            let mut diagnostics = TfplugDiagnostics::new();
            diagnostics.add_error(
                "Unable to upgrade resource state",
                Some(format!(
                    "State for {} was stored in the legacy flatmap format",
                    type_name
                )),
            );
            return Ok(Response::new(upgrade_resource_state::Response {
                upgraded_state: None,
                diagnostics: convert_diagnostics(diagnostics),
            }));
        }

        let values = match serde_json::from_slice::<Dynamic>(&json) {
            Ok(Dynamic::Map(values)) => values,
            Ok(other) => {
                return Err(Status::invalid_argument(format!(
                    "Stored state for {} is a {}, expected an object",
                    type_name,
                    other.type_name()
                )))
            }
            Err(e) => {
                return Err(Status::invalid_argument(format!(
                    "Failed to decode stored state: {}",
                    e
                )))
            }
        };

        tracing::debug!(
            type_name = %type_name,
            version = req.version,
            "upgrading resource state"
        );

        Ok(Response::new(upgrade_resource_state::Response {
            upgraded_state: Some(encode_object(&conform_object(values, &schema.attributes))?),
            diagnostics: vec![],
        }))
    }

    async fn get_resource_identity_schemas(
        &self,
        _request: Request<get_resource_identity_schemas::Request>,
    ) -> std::result::Result<Response<get_resource_identity_schemas::Response>, Status> {
        Ok(Response::new(get_resource_identity_schemas::Response {
            diagnostics: vec![],
        }))
    }

    async fn configure_provider(
        &self,
        request: Request<configure_provider::Request>,
    ) -> std::result::Result<Response<configure_provider::Response>, Status> {
        let req = request.into_inner();
        let config = decode_object(&req.config)?.unwrap_or_default();

        tracing::info!(
            terraform_version = %req.terraform_version,
            "configuring provider"
        );

        let mut provider = self.provider.write().await;
        let schema = provider.provider_schema().await;

        let response = provider
            .configure(ConfigureRequest {
                context: self.stop.clone(),
                config: Config::from(conform_object(config, &schema.attributes)),
            })
            .await;

        if response.diagnostics.has_errors() {
            tracing::warn!("provider configuration failed");
        }

        Ok(Response::new(configure_provider::Response {
            diagnostics: convert_diagnostics(response.diagnostics),
        }))
    }

    async fn read_resource(
        &self,
        request: Request<read_resource::Request>,
    ) -> std::result::Result<Response<read_resource::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let Some(current) = decode_object(&req.current_state)? else {
            return Ok(Response::new(read_resource::Response {
                new_state: Some(encode_null()?),
                diagnostics: vec![],
                private: req.private,
            }));
        };

        let provider = self.provider.read().await;
        let schemas = provider.resource_schemas().await;
        let Some(schema) = schemas.get(&type_name) else {
            return Ok(Response::new(read_resource::Response {
                new_state: req.current_state,
                diagnostics: unknown_type_diagnostics("resource", &type_name),
                private: req.private,
            }));
        };

        let resource = match provider.create_resource(&type_name).await {
            Ok(resource) => resource,
            Err(e) => {
                return Ok(Response::new(read_resource::Response {
                    new_state: req.current_state,
                    diagnostics: error_diagnostics(e.to_string()),
                    private: req.private,
                }))
            }
        };

        let response = resource
            .read(ReadRequest {
                context: self.stop.clone(),
                current_state: State::from(current),
            })
            .await;

        let new_state = match response.state {
            Some(state) => encode_object(&conform_object(state.values, &schema.attributes))?,
            // keep the resource around when the read itself failed
            None if response.diagnostics.has_errors() => match req.current_state {
                Some(current) => current,
                None => encode_null()?,
            },
            None => {
                tracing::info!(type_name = %type_name, "resource no longer exists, removing from state");
                encode_null()?
            }
        };

        Ok(Response::new(read_resource::Response {
            new_state: Some(new_state),
            diagnostics: convert_diagnostics(response.diagnostics),
            private: req.private,
        }))
    }

    async fn plan_resource_change(
        &self,
        request: Request<plan_resource_change::Request>,
    ) -> std::result::Result<Response<plan_resource_change::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let provider = self.provider.read().await;
        let schemas = provider.resource_schemas().await;
        let Some(schema) = schemas.get(&type_name) else {
            return Ok(Response::new(plan_resource_change::Response {
                planned_state: req.proposed_new_state,
                requires_replace: vec![],
                planned_private: req.prior_private,
                diagnostics: unknown_type_diagnostics("resource", &type_name),
                legacy_type_system: false,
            }));
        };

        let prior_state = decode_object(&req.prior_state)?;
        let config = decode_object(&req.config)?.unwrap_or_default();

        // Destroy plans pass through untouched
        let Some(proposed_new_state) = decode_object(&req.proposed_new_state)? else {
            return Ok(Response::new(plan_resource_change::Response {
                planned_state: Some(encode_null()?),
                requires_replace: vec![],
                planned_private: req.prior_private,
                diagnostics: vec![],
                legacy_type_system: false,
            }));
        };

        let is_create = prior_state.is_none();
        let prior_state = conform_object(prior_state.unwrap_or_default(), &schema.attributes);
        let mut planned_state = conform_object(proposed_new_state, &schema.attributes);

        let mut attribute_names: Vec<&String> = schema.attributes.keys().collect();
        attribute_names.sort();

        // Defaults for optional + computed attributes left out of the config
        for name in &attribute_names {
            let attribute = &schema.attributes[*name];
            let Some(default) = &attribute.default else {
                continue;
            };
            if config.get(*name).map_or(true, Dynamic::is_null) {
                let response = default.default_value(DefaultRequest {
                    attribute_path: name.to_string(),
                });
                planned_state.insert(name.to_string(), response.value);
            }
        }

        let changed = is_create
            || !values_equal(
                &Dynamic::Map(prior_state.clone()),
                &Dynamic::Map(planned_state.clone()),
            );

        // Computed values the config does not set are recalculated by apply
        if changed {
            for name in &attribute_names {
                let attribute = &schema.attributes[*name];
                if attribute.computed
                    && attribute.default.is_none()
                    && config.get(*name).map_or(true, Dynamic::is_null)
                {
                    planned_state.insert(name.to_string(), Dynamic::Unknown);
                }
            }
        }

        let mut diagnostics = TfplugDiagnostics::new();
        let mut requires_replace = Vec::new();

        for name in &attribute_names {
            let attribute = &schema.attributes[*name];
            if attribute.plan_modifiers.is_empty() {
                continue;
            }

            let state_value = prior_state.get(*name).cloned().unwrap_or(Dynamic::Null);
            let config_value = config.get(*name).cloned().unwrap_or(Dynamic::Null);
            let mut plan_value = planned_state.get(*name).cloned().unwrap_or(Dynamic::Null);
            let mut replace = false;

            for modifier in &attribute.plan_modifiers {
                let response = modifier.modify_plan(PlanModifyRequest {
                    state: state_value.clone(),
                    plan: plan_value,
                    config: config_value.clone(),
                    attribute_path: name.to_string(),
                });

                plan_value = response.plan_value;
                replace |= response.requires_replace;
                diagnostics.extend(response.diagnostics);
            }

            if replace && !is_create {
                requires_replace.push(to_proto_path(&TfplugAttributePath::new(name)));
            }
            planned_state.insert(name.to_string(), plan_value);
        }

        tracing::debug!(
            type_name = %type_name,
            create = is_create,
            replace = !requires_replace.is_empty(),
            "planned resource change"
        );

        Ok(Response::new(plan_resource_change::Response {
            planned_state: Some(encode_object(&planned_state)?),
            requires_replace,
            planned_private: req.prior_private,
            diagnostics: convert_diagnostics(diagnostics),
            legacy_type_system: false,
        }))
    }

    async fn apply_resource_change(
        &self,
        request: Request<apply_resource_change::Request>,
    ) -> std::result::Result<Response<apply_resource_change::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let prior_state = decode_object(&req.prior_state)?;
        let planned_state = decode_object(&req.planned_state)?;
        let config = decode_object(&req.config)?.unwrap_or_default();

        let provider = self.provider.read().await;
        let schemas = provider.resource_schemas().await;
        let Some(schema) = schemas.get(&type_name) else {
            return Ok(Response::new(apply_resource_change::Response {
                new_state: req.prior_state,
                private: vec![],
                diagnostics: unknown_type_diagnostics("resource", &type_name),
                legacy_type_system: false,
            }));
        };

        let resource = match provider.create_resource(&type_name).await {
            Ok(resource) => resource,
            Err(e) => {
                return Ok(Response::new(apply_resource_change::Response {
                    new_state: match req.prior_state {
                        Some(prior) => Some(prior),
                        None => Some(encode_null()?),
                    },
                    private: vec![],
                    diagnostics: error_diagnostics(e.to_string()),
                    legacy_type_system: false,
                }))
            }
        };

        let context = self.stop.clone();
        let config = Config::from(conform_object(config, &schema.attributes));

        let (new_state, diagnostics) = match (prior_state, planned_state) {
            (None, None) => (None, TfplugDiagnostics::new()),
            (None, Some(planned)) => {
                tracing::info!(type_name = %type_name, "creating resource");
                let response = resource
                    .create(CreateRequest {
                        context,
                        config,
                        planned_state: State::from(planned),
                    })
                    .await;
                if response.diagnostics.has_errors() {
                    (None, response.diagnostics)
                } else {
                    (Some(response.state.values), response.diagnostics)
                }
            }
            (Some(prior), None) => {
                tracing::info!(type_name = %type_name, "deleting resource");
                let response = resource
                    .delete(DeleteRequest {
                        context,
                        current_state: State::from(prior.clone()),
                    })
                    .await;
                if response.diagnostics.has_errors() {
                    (Some(prior), response.diagnostics)
                } else {
                    (None, response.diagnostics)
                }
            }
            (Some(prior), Some(planned)) => {
                tracing::info!(type_name = %type_name, "updating resource");
                let response = resource
                    .update(UpdateRequest {
                        context,
                        config,
                        planned_state: State::from(planned),
                        current_state: State::from(prior.clone()),
                    })
                    .await;
                if response.diagnostics.has_errors() {
                    (Some(prior), response.diagnostics)
                } else {
                    (Some(response.state.values), response.diagnostics)
                }
            }
        };

        let new_state = match new_state {
            Some(values) => {
                let values = conform_object(values, &schema.attributes)
                    .into_iter()
                    .map(|(name, value)| {
                        if value.is_unknown() {
                            tracing::warn!(
                                type_name = %type_name,
                                attribute = %name,
                                "resource left a value unknown after apply"
                            );
                            (name, Dynamic::Null)
                        } else {
                            (name, value)
                        }
                    })
                    .collect();
                encode_object(&values)?
            }
            None => encode_null()?,
        };

        Ok(Response::new(apply_resource_change::Response {
            new_state: Some(new_state),
            private: vec![],
            diagnostics: convert_diagnostics(diagnostics),
            legacy_type_system: false,
        }))
    }

    async fn import_resource_state(
        &self,
        request: Request<import_resource_state::Request>,
    ) -> std::result::Result<Response<import_resource_state::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let provider = self.provider.read().await;
        let schemas = provider.resource_schemas().await;
        let Some(schema) = schemas.get(&type_name) else {
            return Ok(Response::new(import_resource_state::Response {
                imported_resources: vec![],
                diagnostics: unknown_type_diagnostics("resource", &type_name),
            }));
        };

        let resource = match provider.create_resource(&type_name).await {
            Ok(resource) => resource,
            Err(e) => {
                return Ok(Response::new(import_resource_state::Response {
                    imported_resources: vec![],
                    diagnostics: error_diagnostics(e.to_string()),
                }))
            }
        };

        tracing::info!(type_name = %type_name, id = %req.id, "importing resource");

        let response = resource
            .import_state(ImportStateRequest {
                context: self.stop.clone(),
                type_name: type_name.clone(),
                id: req.id,
            })
            .await;

        let imported_resources = match response.state {
            Some(state) if !response.diagnostics.has_errors() => {
                vec![import_resource_state::ImportedResource {
                    type_name,
                    state: Some(encode_object(&conform_object(
                        state.values,
                        &schema.attributes,
                    ))?),
                    private: vec![],
                }]
            }
            _ => vec![],
        };

        Ok(Response::new(import_resource_state::Response {
            imported_resources,
            diagnostics: convert_diagnostics(response.diagnostics),
        }))
    }

    async fn read_data_source(
        &self,
        request: Request<read_data_source::Request>,
    ) -> std::result::Result<Response<read_data_source::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;
        let config = decode_object(&req.config)?.unwrap_or_default();

        let provider = self.provider.read().await;
        let schemas = provider.data_source_schemas().await;
        let Some(schema) = schemas.get(&type_name) else {
            return Ok(Response::new(read_data_source::Response {
                state: None,
                diagnostics: unknown_type_diagnostics("data source", &type_name),
            }));
        };

        let data_source = match provider.create_data_source(&type_name).await {
            Ok(data_source) => data_source,
            Err(e) => {
                return Ok(Response::new(read_data_source::Response {
                    state: None,
                    diagnostics: error_diagnostics(e.to_string()),
                }))
            }
        };

        tracing::debug!(type_name = %type_name, "reading data source");

        let response = data_source
            .read(ReadDataSourceRequest {
                context: self.stop.clone(),
                config: Config::from(conform_object(config, &schema.attributes)),
            })
            .await;

        let state = match response.state {
            Some(state) if !response.diagnostics.has_errors() => Some(encode_object(
                &conform_object(state.values, &schema.attributes),
            )?),
            _ => None,
        };

        Ok(Response::new(read_data_source::Response {
            state,
            diagnostics: convert_diagnostics(response.diagnostics),
        }))
    }

    async fn get_functions(
        &self,
        _request: Request<get_functions::Request>,
    ) -> std::result::Result<Response<get_functions::Response>, Status> {
        Ok(Response::new(get_functions::Response {
            diagnostics: vec![],
        }))
    }

    async fn stop_provider(
        &self,
        _request: Request<stop_provider::Request>,
    ) -> std::result::Result<Response<stop_provider::Response>, Status> {
        tracing::info!("stop requested, cancelling in-flight operations");
        self.stop.cancel();

        Ok(Response::new(stop_provider::Response {
            error: String::new(),
        }))
    }
}

// Helper functions

fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        plan_destroy: true,
        get_provider_schema_optional: false,
        move_resource_state: false,
    }
}

fn to_proto_schema(version: i64, description: &str, attributes: &HashMap<String, Attribute>) -> Schema {
    Schema {
        version,
        block: Some(schema::Block {
            version,
            attributes: to_proto_attributes(attributes),
            block_types: vec![],
            description: description.to_string(),
            description_kind: StringKind::Plain as i32,
            deprecated: false,
        }),
    }
}

fn to_proto_attributes(attributes: &HashMap<String, Attribute>) -> Vec<schema::Attribute> {
    let mut attributes: Vec<&Attribute> = attributes.values().collect();
    attributes.sort_by(|a, b| a.name.cmp(&b.name));
    attributes.into_iter().map(to_proto_attribute).collect()
}

fn to_proto_attribute(attr: &Attribute) -> schema::Attribute {
    let (r#type, nested_type) = match &attr.nested {
        Some(nested) => (
            vec![],
            Some(schema::Object {
                attributes: to_proto_attributes(&nested.attributes),
                nesting: match nested.nesting {
                    NestingMode::Single => schema::object::NestingMode::Single,
                    NestingMode::List => schema::object::NestingMode::List,
                    NestingMode::Set => schema::object::NestingMode::Set,
                    NestingMode::Map => schema::object::NestingMode::Map,
                } as i32,
                min_items: 0,
                max_items: 0,
            }),
        ),
        None => (attr.r#type.to_bytes(), None),
    };

    schema::Attribute {
        name: attr.name.clone(),
        r#type,
        nested_type,
        description: attr.description.clone(),
        required: attr.required,
        optional: attr.optional,
        computed: attr.computed,
        sensitive: attr.sensitive,
        description_kind: StringKind::Plain as i32,
        deprecated: attr.deprecated,
        write_only: false,
    }
}

#[allow(clippy::result_large_err)]
fn decode_value(value: &Option<DynamicValue>) -> std::result::Result<Dynamic, Status> {
    let Some(value) = value else {
        return Ok(Dynamic::Null);
    };

    if !value.msgpack.is_empty() {
        decode::from_slice::<Dynamic>(&value.msgpack)
            .map_err(|e| Status::invalid_argument(format!("Failed to decode msgpack: {}", e)))
    } else if !value.json.is_empty() {
        serde_json::from_slice::<Dynamic>(&value.json)
            .map_err(|e| Status::invalid_argument(format!("Failed to decode json: {}", e)))
    } else {
        Ok(Dynamic::Null)
    }
}

/// Decodes an object value; `None` stands for a null object (no state)
#[allow(clippy::result_large_err)]
fn decode_object(value: &Option<DynamicValue>) -> std::result::Result<Option<Values>, Status> {
    match decode_value(value)? {
        Dynamic::Null => Ok(None),
        Dynamic::Map(values) => Ok(Some(values)),
        other => Err(Status::invalid_argument(format!(
            "Expected an object value, got {}",
            other.type_name()
        ))),
    }
}

#[allow(clippy::result_large_err)]
fn encode_object(values: &Values) -> std::result::Result<DynamicValue, Status> {
    let msgpack = encode::to_vec_named(values)
        .map_err(|e| Status::internal(format!("Failed to encode msgpack: {}", e)))?;

    Ok(DynamicValue {
        msgpack,
        json: vec![],
    })
}

#[allow(clippy::result_large_err)]
fn encode_null() -> std::result::Result<DynamicValue, Status> {
    let msgpack = encode::to_vec_named(&Dynamic::Null)
        .map_err(|e| Status::internal(format!("Failed to encode msgpack: {}", e)))?;

    Ok(DynamicValue {
        msgpack,
        json: vec![],
    })
}

/// Shapes an object to exactly the declared attributes: missing ones become
/// null and undeclared ones are dropped, recursively through nested attributes
fn conform_object(mut values: Values, attributes: &HashMap<String, Attribute>) -> Values {
    attributes
        .iter()
        .map(|(name, attr)| {
            let value = values.remove(name).unwrap_or(Dynamic::Null);
            (name.clone(), conform_value(value, attr))
        })
        .collect()
}

fn conform_value(value: Dynamic, attr: &Attribute) -> Dynamic {
    let Some(nested) = &attr.nested else {
        return value;
    };

    let conform_element = |element: Dynamic| match element {
        Dynamic::Map(values) => Dynamic::Map(conform_object(values, &nested.attributes)),
        other => other,
    };

    match (nested.nesting, value) {
        (NestingMode::Single, value) => conform_element(value),
        (NestingMode::List | NestingMode::Set, Dynamic::List(items)) => {
            Dynamic::List(items.into_iter().map(conform_element).collect())
        }
        (NestingMode::Map, Dynamic::Map(entries)) => Dynamic::Map(
            entries
                .into_iter()
                .map(|(key, element)| (key, conform_element(element)))
                .collect(),
        ),
        (_, value) => value,
    }
}

/// Checks a configuration object against its attributes. Unknown values are
/// skipped; they are validated again once known.
fn validate_object(
    values: &Values,
    attributes: &HashMap<String, Attribute>,
    path: &TfplugAttributePath,
    diagnostics: &mut TfplugDiagnostics,
) {
    let mut names: Vec<&String> = attributes.keys().collect();
    names.sort();

    for name in names {
        let attr = &attributes[name];
        let attr_path = path.clone().attribute(name);
        let value = values.get(name).unwrap_or(&Dynamic::Null);

        if value.is_null() {
            if attr.required {
                diagnostics.add_attribute_error(
                    attr_path.clone(),
                    format!("Missing required field: {}", attr_path),
                    Some(format!(
                        "The field '{}' is required but was not provided",
                        attr_path
                    )),
                );
            }
            continue;
        }

        if !attr.required && !attr.optional {
            diagnostics.add_attribute_error(
                attr_path.clone(),
                format!("Computed field cannot be set: {}", attr_path),
                Some(format!("The field '{}' is read-only", attr_path)),
            );
            continue;
        }

        if value.is_unknown() {
            continue;
        }

        let expected = attr.value_type();
        if !expected.accepts(value) {
            diagnostics.add_attribute_error(
                attr_path.clone(),
                format!("Type mismatch for field: {}", attr_path),
                Some(format!(
                    "Field '{}' expects type {} but got {}",
                    attr_path,
                    expected,
                    value.type_name()
                )),
            );
            continue;
        }

        let mut attr_diagnostics = TfplugDiagnostics::new();
        for validator in &attr.validators {
            validator.validate(value, &attr_path.to_string(), &mut attr_diagnostics);
        }
        for diagnostic in attr_diagnostics
            .errors
            .iter_mut()
            .chain(attr_diagnostics.warnings.iter_mut())
        {
            diagnostic.attribute.get_or_insert_with(|| attr_path.clone());
        }
        diagnostics.extend(attr_diagnostics);

        if let Some(nested) = &attr.nested {
            match (nested.nesting, value) {
                (NestingMode::Single, Dynamic::Map(object)) => {
                    validate_object(object, &nested.attributes, &attr_path, diagnostics);
                }
                (NestingMode::List | NestingMode::Set, Dynamic::List(items)) => {
                    for (index, item) in items.iter().enumerate() {
                        if let Dynamic::Map(object) = item {
                            validate_object(
                                object,
                                &nested.attributes,
                                &attr_path.clone().index(index as i64),
                                diagnostics,
                            );
                        }
                    }
                }
                (NestingMode::Map, Dynamic::Map(entries)) => {
                    for (key, item) in entries {
                        if let Dynamic::Map(object) = item {
                            validate_object(
                                object,
                                &nested.attributes,
                                &attr_path.clone().key(key),
                                diagnostics,
                            );
                        }
                    }
                }
                _ => {}
            }
        }
    }

    let mut undeclared: Vec<&String> = values
        .keys()
        .filter(|name| !attributes.contains_key(*name))
        .collect();
    undeclared.sort();

    for name in undeclared {
        let attr_path = path.clone().attribute(name);
        diagnostics.add_attribute_error(
            attr_path.clone(),
            format!("Unknown field: {}", attr_path),
            Some(format!(
                "The field '{}' is not defined in the schema",
                attr_path
            )),
        );
    }
}

fn to_proto_path(path: &TfplugAttributePath) -> AttributePath {
    AttributePath {
        steps: path
            .steps
            .iter()
            .map(|step| Step {
                selector: Some(match step {
                    AttributePathStep::AttributeName(name) => Selector::AttributeName(name.clone()),
                    AttributePathStep::ElementKeyString(key) => {
                        Selector::ElementKeyString(key.clone())
                    }
                    AttributePathStep::ElementKeyInt(idx) => Selector::ElementKeyInt(*idx),
                }),
            })
            .collect(),
    }
}

fn convert_diagnostics(diags: TfplugDiagnostics) -> Vec<Diagnostic> {
    let severity_of = |severity: diagnostic::Severity| {
        move |diag: crate::types::Diagnostic| Diagnostic {
            severity: severity as i32,
            summary: diag.summary,
            detail: diag.detail.unwrap_or_default(),
            attribute: diag.attribute.as_ref().map(to_proto_path),
        }
    };

    diags
        .errors
        .into_iter()
        .map(severity_of(diagnostic::Severity::Error))
        .chain(
            diags
                .warnings
                .into_iter()
                .map(severity_of(diagnostic::Severity::Warning)),
        )
        .collect()
}

fn error_diagnostics(summary: String) -> Vec<Diagnostic> {
    let mut diagnostics = TfplugDiagnostics::new();
    diagnostics.add_error(summary, None::<String>);
    convert_diagnostics(diagnostics)
}

fn unknown_type_diagnostics(kind: &str, type_name: &str) -> Vec<Diagnostic> {
    error_diagnostics(format!("Unknown {} type: {}", kind, type_name))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::defaults::StaticDefault;
    use crate::plan_modifier::{RequiresReplaceIfChanged, UseStateForUnknown};
    use crate::provider::{DataSourceSchema, DataSourceV2, ProviderSchema, ResourceSchema, ResourceV2};
    use crate::request::{
        ConfigureResponse, CreateResponse, DataSourceSchemaResponse, DeleteResponse,
        ReadDataSourceResponse, ReadResponse, ResourceSchemaResponse, SchemaRequest,
        UpdateResponse,
    };
    use crate::schema::SchemaBuilder;
    use crate::validator::OneOfValidator;
    use crate::{AttributeBuilder, Result};
    use async_trait::async_trait;

    fn widget_schema() -> ResourceSchema {
        SchemaBuilder::new()
            .description("Test widget")
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .computed()
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute("name", AttributeBuilder::string("name").required())
            .attribute(
                "owner_id",
                AttributeBuilder::string("owner_id")
                    .required()
                    .plan_modifier(Box::new(RequiresReplaceIfChanged)),
            )
            .attribute(
                "enabled",
                AttributeBuilder::bool("enabled")
                    .optional()
                    .computed()
                    .default(StaticDefault::bool(true)),
            )
            .attribute(
                "tiers",
                AttributeBuilder::list_nested(
                    "tiers",
                    vec![AttributeBuilder::string("mode")
                        .required()
                        .validator(Box::new(OneOfValidator::new(["email", "sms"])))
                        .build()],
                )
                .optional(),
            )
            .build_resource(0)
    }

    struct TestProvider {
        configured: bool,
        gone: bool,
    }

    #[async_trait]
    impl ProviderV2 for TestProvider {
        async fn provider_schema(&self) -> ProviderSchema {
            SchemaBuilder::new()
                .attribute("token", AttributeBuilder::string("token").optional().sensitive())
                .build_data_source(0)
        }

        async fn configure(&mut self, request: ConfigureRequest) -> ConfigureResponse {
            let mut diagnostics = TfplugDiagnostics::new();
            if request.config.get_string("token").as_deref() == Some("bad") {
                diagnostics.add_error("Invalid token", None::<String>);
            } else {
                self.configured = true;
            }
            ConfigureResponse { diagnostics }
        }

        async fn create_resource(&self, name: &str) -> Result<Box<dyn ResourceV2>> {
            if !self.configured {
                return Err(crate::TfplugError::ProviderNotConfigured);
            }
            match name {
                "test_widget" => Ok(Box::new(TestResource { gone: self.gone })),
                _ => Err(format!("Unknown resource type: {}", name).into()),
            }
        }

        async fn create_data_source(&self, name: &str) -> Result<Box<dyn DataSourceV2>> {
            match name {
                "test_lookup" => Ok(Box::new(TestDataSource)),
                _ => Err(format!("Unknown data source type: {}", name).into()),
            }
        }

        async fn resource_schemas(&self) -> HashMap<String, ResourceSchema> {
            HashMap::from([("test_widget".to_string(), widget_schema())])
        }

        async fn data_source_schemas(&self) -> HashMap<String, DataSourceSchema> {
            HashMap::from([(
                "test_lookup".to_string(),
                SchemaBuilder::new()
                    .attribute("name", AttributeBuilder::string("name").required())
                    .attribute("id", AttributeBuilder::string("id").computed())
                    .build_data_source(0),
            )])
        }

        async fn validate_resource_config(&self, _type_name: &str, config: &Config) -> TfplugDiagnostics {
            let mut diagnostics = TfplugDiagnostics::new();
            if config.get_string("name").as_deref() == Some("reserved") {
                diagnostics.add_attribute_error(
                    TfplugAttributePath::new("name"),
                    "Reserved name",
                    None::<String>,
                );
            }
            diagnostics
        }
    }

    struct TestResource {
        gone: bool,
    }

    #[async_trait]
    impl ResourceV2 for TestResource {
        async fn schema(&self, _request: SchemaRequest) -> ResourceSchemaResponse {
            ResourceSchemaResponse {
                schema: widget_schema(),
                diagnostics: TfplugDiagnostics::new(),
            }
        }

        async fn create(&self, request: CreateRequest) -> CreateResponse {
            let mut state = request.planned_state;
            let mut diagnostics = TfplugDiagnostics::new();
            if state.get_string("name").as_deref() == Some("fail") {
                diagnostics.add_error("API returned error (HTTP 400): bad", None::<String>);
            }
            state.set("id", "widget-1");
            CreateResponse { state, diagnostics }
        }

        async fn read(&self, request: ReadRequest) -> ReadResponse {
            ReadResponse {
                state: (!self.gone).then_some(request.current_state),
                diagnostics: TfplugDiagnostics::new(),
            }
        }

        async fn update(&self, request: UpdateRequest) -> UpdateResponse {
            let mut diagnostics = TfplugDiagnostics::new();
            if request.planned_state.get_string("name").as_deref() == Some("fail") {
                diagnostics.add_error("update failed", None::<String>);
            }
            UpdateResponse {
                state: request.planned_state,
                diagnostics,
            }
        }

        async fn delete(&self, _request: DeleteRequest) -> DeleteResponse {
            DeleteResponse {
                diagnostics: TfplugDiagnostics::new(),
            }
        }
    }

    struct TestDataSource;

    #[async_trait]
    impl DataSourceV2 for TestDataSource {
        async fn schema(&self, _request: SchemaRequest) -> DataSourceSchemaResponse {
            unreachable!("schemas are served by the provider")
        }

        async fn read(&self, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
            let mut state = State::from(request.config.values);
            state.set("id", "lookup-1");
            ReadDataSourceResponse {
                state: Some(state),
                diagnostics: TfplugDiagnostics::new(),
            }
        }
    }

    fn service(configured: bool) -> ProviderService<TestProvider> {
        ProviderService::new(Arc::new(RwLock::new(TestProvider {
            configured,
            gone: false,
        })))
    }

    fn dynamic(values: &[(&str, Dynamic)]) -> Option<DynamicValue> {
        let values: Values = values
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Some(DynamicValue {
            msgpack: encode::to_vec_named(&values).unwrap(),
            json: vec![],
        })
    }

    fn null_value() -> Option<DynamicValue> {
        Some(encode_null().unwrap())
    }

    fn decode(value: Option<DynamicValue>) -> Option<Values> {
        decode_object(&value).unwrap()
    }

    fn s(value: &str) -> Dynamic {
        Dynamic::String(value.to_string())
    }

    #[tokio::test]
    async fn schema_includes_nested_attributes_and_provider_block() {
        let service = service(false);

        let response = service
            .get_provider_schema(Request::new(get_provider_schema::Request {}))
            .await
            .unwrap()
            .into_inner();

        let provider = response.provider.unwrap().block.unwrap();
        assert_eq!(provider.attributes[0].name, "token");
        assert!(provider.attributes[0].sensitive);

        let widget = response.resource_schemas["test_widget"].block.clone().unwrap();
        let names: Vec<&str> = widget.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["enabled", "id", "name", "owner_id", "tiers"]);

        let tiers = widget.attributes.iter().find(|a| a.name == "tiers").unwrap();
        assert!(tiers.r#type.is_empty());
        let nested = tiers.nested_type.as_ref().unwrap();
        assert_eq!(nested.nesting, schema::object::NestingMode::List as i32);
        assert_eq!(nested.attributes[0].name, "mode");
        assert!(response.data_source_schemas.contains_key("test_lookup"));
    }

    #[tokio::test]
    async fn metadata_lists_resources_and_data_sources() {
        let response = service(false)
            .get_metadata(Request::new(get_metadata::Request {}))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.resources[0].type_name, "test_widget");
        assert_eq!(response.data_sources[0].type_name, "test_lookup");
    }

    #[tokio::test]
    async fn validate_reports_missing_unknown_and_mistyped_fields() {
        let response = service(false)
            .validate_resource_config(Request::new(validate_resource_config::Request {
                type_name: "test_widget".to_string(),
                config: dynamic(&[
                    ("name", Dynamic::Number(1.0)),
                    ("colour", s("red")),
                ]),
                client_capabilities: None,
            }))
            .await
            .unwrap()
            .into_inner();

        let summaries: Vec<&str> = response
            .diagnostics
            .iter()
            .map(|d| d.summary.as_str())
            .collect();
        assert_eq!(
            summaries,
            vec![
                "Type mismatch for field: name",
                "Missing required field: owner_id",
                "Unknown field: colour",
            ]
        );
    }

    #[tokio::test]
    async fn validate_runs_nested_validators_with_paths() {
        let mut tier = HashMap::new();
        tier.insert("mode".to_string(), s("pager"));

        let response = service(false)
            .validate_resource_config(Request::new(validate_resource_config::Request {
                type_name: "test_widget".to_string(),
                config: dynamic(&[
                    ("name", s("ops")),
                    ("owner_id", s("owner-1")),
                    ("tiers", Dynamic::List(vec![Dynamic::Map(tier)])),
                ]),
                client_capabilities: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.diagnostics.len(), 1);
        let diagnostic = &response.diagnostics[0];
        assert_eq!(diagnostic.summary, "tiers[0].mode must be one of: email, sms");
        assert_eq!(diagnostic.attribute.as_ref().unwrap().steps.len(), 3);
    }

    #[tokio::test]
    async fn validate_skips_unknown_values_and_runs_provider_checks() {
        let response = service(false)
            .validate_resource_config(Request::new(validate_resource_config::Request {
                type_name: "test_widget".to_string(),
                config: dynamic(&[("name", s("reserved")), ("owner_id", Dynamic::Unknown)]),
                client_capabilities: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Reserved name");
    }

    #[tokio::test]
    async fn plan_create_marks_computed_unknown_and_applies_defaults() {
        let response = service(false)
            .plan_resource_change(Request::new(plan_resource_change::Request {
                type_name: "test_widget".to_string(),
                prior_state: null_value(),
                proposed_new_state: dynamic(&[("name", s("ops")), ("owner_id", s("o-1"))]),
                config: dynamic(&[("name", s("ops")), ("owner_id", s("o-1"))]),
                prior_private: vec![],
                provider_meta: None,
                client_capabilities: None,
            }))
            .await
            .unwrap()
            .into_inner();

        let planned = decode(response.planned_state).unwrap();
        assert_eq!(planned["id"], Dynamic::Unknown);
        assert_eq!(planned["enabled"], Dynamic::Bool(true));
        assert_eq!(planned["tiers"], Dynamic::Null);
        assert!(response.requires_replace.is_empty());
    }

    #[tokio::test]
    async fn plan_update_keeps_id_and_flags_replacement() {
        let prior = [
            ("id", s("widget-1")),
            ("name", s("ops")),
            ("owner_id", s("o-1")),
            ("enabled", Dynamic::Bool(true)),
            ("tiers", Dynamic::Null),
        ];
        let proposed = [
            ("id", s("widget-1")),
            ("name", s("ops")),
            ("owner_id", s("o-2")),
            ("enabled", Dynamic::Bool(true)),
            ("tiers", Dynamic::Null),
        ];

        let response = service(false)
            .plan_resource_change(Request::new(plan_resource_change::Request {
                type_name: "test_widget".to_string(),
                prior_state: dynamic(&prior),
                proposed_new_state: dynamic(&proposed),
                config: dynamic(&[("name", s("ops")), ("owner_id", s("o-2"))]),
                prior_private: vec![],
                provider_meta: None,
                client_capabilities: None,
            }))
            .await
            .unwrap()
            .into_inner();

        let planned = decode(response.planned_state).unwrap();
        assert_eq!(planned["id"], s("widget-1"));
        assert_eq!(response.requires_replace.len(), 1);
        assert_eq!(
            response.requires_replace[0].steps[0].selector,
            Some(Selector::AttributeName("owner_id".to_string()))
        );
    }

    #[tokio::test]
    async fn plan_destroy_passes_through() {
        let response = service(false)
            .plan_resource_change(Request::new(plan_resource_change::Request {
                type_name: "test_widget".to_string(),
                prior_state: dynamic(&[("id", s("widget-1"))]),
                proposed_new_state: null_value(),
                config: null_value(),
                prior_private: vec![],
                provider_meta: None,
                client_capabilities: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(decode(response.planned_state).is_none());
    }

    #[tokio::test]
    async fn configure_surfaces_provider_errors() {
        let service = service(false);

        let response = service
            .configure_provider(Request::new(configure_provider::Request {
                terraform_version: "1.9.0".to_string(),
                config: dynamic(&[("token", s("bad"))]),
                client_capabilities: None,
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.diagnostics[0].summary, "Invalid token");

        let response = service
            .configure_provider(Request::new(configure_provider::Request {
                terraform_version: "1.9.0".to_string(),
                config: dynamic(&[]),
                client_capabilities: None,
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(response.diagnostics.is_empty());
        assert!(service.provider.read().await.configured);
    }

    #[tokio::test]
    async fn apply_before_configure_reports_diagnostic() {
        let response = service(false)
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: "test_widget".to_string(),
                prior_state: null_value(),
                planned_state: dynamic(&[("name", s("ops"))]),
                config: dynamic(&[("name", s("ops"))]),
                planned_private: vec![],
                provider_meta: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
        assert!(decode(response.new_state).is_none());
    }

    #[tokio::test]
    async fn apply_create_returns_full_state() {
        let response = service(true)
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: "test_widget".to_string(),
                prior_state: null_value(),
                planned_state: dynamic(&[
                    ("name", s("ops")),
                    ("owner_id", s("o-1")),
                    ("id", Dynamic::Unknown),
                ]),
                config: dynamic(&[("name", s("ops")), ("owner_id", s("o-1"))]),
                planned_private: vec![],
                provider_meta: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.diagnostics.is_empty());
        let state = decode(response.new_state).unwrap();
        assert_eq!(state["id"], s("widget-1"));
        assert_eq!(state["tiers"], Dynamic::Null);
        assert_eq!(state.len(), 5);
    }

    #[tokio::test]
    async fn apply_create_error_returns_no_state() {
        let response = service(true)
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: "test_widget".to_string(),
                prior_state: null_value(),
                planned_state: dynamic(&[("name", s("fail")), ("owner_id", s("o-1"))]),
                config: dynamic(&[("name", s("fail")), ("owner_id", s("o-1"))]),
                planned_private: vec![],
                provider_meta: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.diagnostics.len(), 1);
        assert!(decode(response.new_state).is_none());
    }

    #[tokio::test]
    async fn apply_update_error_keeps_prior_state() {
        let response = service(true)
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: "test_widget".to_string(),
                prior_state: dynamic(&[("id", s("widget-1")), ("name", s("ops"))]),
                planned_state: dynamic(&[("id", s("widget-1")), ("name", s("fail"))]),
                config: dynamic(&[("name", s("fail"))]),
                planned_private: vec![],
                provider_meta: None,
            }))
            .await
            .unwrap()
            .into_inner();

        let state = decode(response.new_state).unwrap();
        assert_eq!(state["name"], s("ops"));
    }

    #[tokio::test]
    async fn apply_delete_returns_null_state() {
        let response = service(true)
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: "test_widget".to_string(),
                prior_state: dynamic(&[("id", s("widget-1"))]),
                planned_state: null_value(),
                config: null_value(),
                planned_private: vec![],
                provider_meta: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.diagnostics.is_empty());
        assert!(decode(response.new_state).is_none());
    }

    #[tokio::test]
    async fn read_of_missing_resource_removes_it() {
        let service = ProviderService::new(Arc::new(RwLock::new(TestProvider {
            configured: true,
            gone: true,
        })));

        let response = service
            .read_resource(Request::new(read_resource::Request {
                type_name: "test_widget".to_string(),
                current_state: dynamic(&[("id", s("widget-1"))]),
                private: vec![],
                provider_meta: None,
                client_capabilities: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(decode(response.new_state).is_none());
    }

    #[tokio::test]
    async fn import_fills_every_attribute() {
        let response = service(true)
            .import_resource_state(Request::new(import_resource_state::Request {
                type_name: "test_widget".to_string(),
                id: "widget-9".to_string(),
                client_capabilities: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.imported_resources.len(), 1);
        let state = decode(response.imported_resources[0].state.clone()).unwrap();
        assert_eq!(state["id"], s("widget-9"));
        assert_eq!(state["name"], Dynamic::Null);
        assert_eq!(state.len(), 5);
    }

    #[tokio::test]
    async fn upgrade_converts_json_state_to_msgpack() {
        let response = service(false)
            .upgrade_resource_state(Request::new(upgrade_resource_state::Request {
                type_name: "test_widget".to_string(),
                version: 0,
                raw_state: Some(RawState {
                    json: br#"{"id":"widget-1","name":"ops","legacy":true}"#.to_vec(),
                    flatmap: HashMap::new(),
                }),
            }))
            .await
            .unwrap()
            .into_inner();

        let state = decode(response.upgraded_state).unwrap();
        assert_eq!(state["id"], s("widget-1"));
        assert!(!state.contains_key("legacy"));
        assert_eq!(state["owner_id"], Dynamic::Null);
    }

    #[tokio::test]
    async fn read_data_source_returns_conformed_state() {
        let response = service(true)
            .read_data_source(Request::new(read_data_source::Request {
                type_name: "test_lookup".to_string(),
                config: dynamic(&[("name", s("ops"))]),
                provider_meta: None,
                client_capabilities: None,
            }))
            .await
            .unwrap()
            .into_inner();

        let state = decode(response.state).unwrap();
        assert_eq!(state["id"], s("lookup-1"));
        assert_eq!(state["name"], s("ops"));
    }

    #[tokio::test]
    async fn stop_cancels_request_context() {
        let service = service(true);
        assert!(!service.stop.is_cancelled());

        service
            .stop_provider(Request::new(stop_provider::Request {}))
            .await
            .unwrap();

        assert!(service.stop.is_cancelled());
    }
}
