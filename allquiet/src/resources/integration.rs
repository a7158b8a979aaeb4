use tfplug::defaults::StaticDefault;
use tfplug::plan_modifier::{RequiresReplaceIfChanged, UseStateForUnknown};
use tfplug::{AttributeBuilder, ResourceSchema, SchemaBuilder, State};

use super::{id_attribute, AllQuietResource};
use crate::api::integration::{IntegrationRequest, IntegrationResponse};
use crate::helpers::{null_if_none, opt_bool, string};
use crate::validators::{one_of, GuidValidator, INTEGRATION_TYPES};

pub struct IntegrationResource;

impl AllQuietResource for IntegrationResource {
    type Api = IntegrationResponse;

    const TYPE_NAME: &'static str = "allquiet_integration";
    const DISPLAY_NAME: &'static str = "integration";

    fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .description("An inbound integration that turns alerts of a monitoring tool into incidents")
            .attribute("id", id_attribute())
            .attribute(
                "display_name",
                AttributeBuilder::string("display_name")
                    .required()
                    .description("Name of the integration"),
            )
            .attribute(
                "team_id",
                AttributeBuilder::string("team_id")
                    .required()
                    .description("Team receiving the incidents")
                    .validator(Box::new(GuidValidator)),
            )
            .attribute(
                "type",
                AttributeBuilder::string("type")
                    .required()
                    .description("Monitoring tool, e.g. Datadog or Webhook. Changing it recreates the integration.")
                    .validator(one_of(&INTEGRATION_TYPES))
                    .plan_modifier(Box::new(RequiresReplaceIfChanged)),
            )
            .attribute(
                "is_muted",
                AttributeBuilder::bool("is_muted")
                    .optional()
                    .computed()
                    .description("Create incidents without paging anyone. Defaults to false.")
                    .default(StaticDefault::bool(false)),
            )
            .attribute(
                "is_inbound_email_enabled",
                AttributeBuilder::bool("is_inbound_email_enabled")
                    .optional()
                    .computed()
                    .description("Also accept alerts sent by email. Defaults to false.")
                    .default(StaticDefault::bool(false)),
            )
            .attribute(
                "webhook_url",
                AttributeBuilder::string("webhook_url")
                    .computed()
                    .sensitive()
                    .description("URL the monitoring tool posts alerts to")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .build_resource(0)
    }

    fn map_request(plan: &State) -> IntegrationRequest {
        map_integration_request(plan)
    }

    fn map_response_to_state(response: &IntegrationResponse) -> State {
        map_integration_response_to_state(response)
    }
}

pub fn map_integration_request(plan: &State) -> IntegrationRequest {
    IntegrationRequest {
        display_name: string(&plan.values, "display_name"),
        team_id: string(&plan.values, "team_id"),
        integration_type: string(&plan.values, "type"),
        is_muted: opt_bool(&plan.values, "is_muted"),
        is_inbound_email_enabled: opt_bool(&plan.values, "is_inbound_email_enabled"),
    }
}

pub fn map_integration_response_to_state(response: &IntegrationResponse) -> State {
    let integration = &response.integration;
    let mut state = State::new();
    state.set("id", response.id.as_str());
    state.set("display_name", integration.display_name.as_str());
    state.set("team_id", integration.team_id.as_str());
    state.set("type", integration.integration_type.as_str());
    state.set("is_muted", integration.is_muted.unwrap_or(false));
    state.set(
        "is_inbound_email_enabled",
        integration.is_inbound_email_enabled.unwrap_or(false),
    );
    state.set("webhook_url", null_if_none(response.webhook_url.clone()));
    state
}
