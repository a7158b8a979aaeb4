use tfplug::defaults::StaticDefault;
use tfplug::plan_modifier::RequiresReplaceIfChanged;
use tfplug::{AttributeBuilder, ResourceSchema, SchemaBuilder, State};

use super::{id_attribute, AllQuietResource};
use crate::api::outbound_integration::{OutboundIntegrationRequest, OutboundIntegrationResponse};
use crate::helpers::{null_if_none, opt_bool, opt_string, string};
use crate::validators::{one_of, GuidValidator, OUTBOUND_INTEGRATION_TYPES};

pub struct OutboundIntegrationResource;

impl AllQuietResource for OutboundIntegrationResource {
    type Api = OutboundIntegrationResponse;

    const TYPE_NAME: &'static str = "allquiet_outbound_integration";
    const DISPLAY_NAME: &'static str = "outbound integration";

    fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .description("An outbound integration that forwards incidents to chat or ticketing tools")
            .attribute("id", id_attribute())
            .attribute(
                "display_name",
                AttributeBuilder::string("display_name")
                    .required()
                    .description("Name of the outbound integration"),
            )
            .attribute(
                "team_id",
                AttributeBuilder::string("team_id")
                    .optional()
                    .description("Owning team; unset for organization wide integrations")
                    .validator(Box::new(GuidValidator)),
            )
            .attribute(
                "type",
                AttributeBuilder::string("type")
                    .required()
                    .description("Target tool, e.g. Slack. Changing it recreates the integration.")
                    .validator(one_of(&OUTBOUND_INTEGRATION_TYPES))
                    .plan_modifier(Box::new(RequiresReplaceIfChanged)),
            )
            .attribute(
                "triggers_only_on_forwarded",
                AttributeBuilder::bool("triggers_only_on_forwarded")
                    .optional()
                    .computed()
                    .description("Only trigger for incidents explicitly forwarded by a routing rule. Defaults to false.")
                    .default(StaticDefault::bool(false)),
            )
            .attribute(
                "skip_updating_after_forwarding",
                AttributeBuilder::bool("skip_updating_after_forwarding")
                    .optional()
                    .computed()
                    .description("Do not push incident updates after the first forward. Defaults to false.")
                    .default(StaticDefault::bool(false)),
            )
            .build_resource(0)
    }

    fn map_request(plan: &State) -> OutboundIntegrationRequest {
        map_outbound_integration_request(plan)
    }

    fn map_response_to_state(response: &OutboundIntegrationResponse) -> State {
        map_outbound_integration_response_to_state(response)
    }
}

pub fn map_outbound_integration_request(plan: &State) -> OutboundIntegrationRequest {
    OutboundIntegrationRequest {
        display_name: string(&plan.values, "display_name"),
        team_id: opt_string(&plan.values, "team_id"),
        integration_type: string(&plan.values, "type"),
        triggers_only_on_forwarded: opt_bool(&plan.values, "triggers_only_on_forwarded"),
        skip_updating_after_forwarding: opt_bool(&plan.values, "skip_updating_after_forwarding"),
    }
}

pub fn map_outbound_integration_response_to_state(response: &OutboundIntegrationResponse) -> State {
    let integration = &response.integration;
    let mut state = State::new();
    state.set("id", response.id.as_str());
    state.set("display_name", integration.display_name.as_str());
    state.set("team_id", null_if_none(integration.team_id.clone()));
    state.set("type", integration.integration_type.as_str());
    state.set(
        "triggers_only_on_forwarded",
        integration.triggers_only_on_forwarded.unwrap_or(false),
    );
    state.set(
        "skip_updating_after_forwarding",
        integration.skip_updating_after_forwarding.unwrap_or(false),
    );
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organization_wide_integration_has_null_team() {
        let mut plan = State::new();
        plan.set("id", "o1");
        plan.set("display_name", "Slack #incidents");
        plan.set_null("team_id");
        plan.set("type", "Slack");
        plan.set("triggers_only_on_forwarded", true);
        plan.set("skip_updating_after_forwarding", false);

        let request = map_outbound_integration_request(&plan);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "displayName": "Slack #incidents",
                "type": "Slack",
                "triggersOnlyOnForwarded": true,
                "skipUpdatingAfterForwarding": false
            })
        );

        let response = OutboundIntegrationResponse {
            id: "o1".to_string(),
            integration: request,
        };
        assert_eq!(map_outbound_integration_response_to_state(&response), plan);
    }

    #[test]
    fn flags_absent_from_the_response_read_back_as_false() {
        let response: OutboundIntegrationResponse = serde_json::from_str(
            r#"{"id": "o1", "displayName": "Jira", "type": "Jira"}"#,
        )
        .unwrap();

        let state = map_outbound_integration_response_to_state(&response);
        assert_eq!(state.get_bool("triggers_only_on_forwarded"), Some(false));
        assert_eq!(state.get_bool("skip_updating_after_forwarding"), Some(false));

        let schema = OutboundIntegrationResource::schema_static();
        assert!(schema.attributes["triggers_only_on_forwarded"].computed);
        assert!(schema.attributes["skip_updating_after_forwarding"].default.is_some());
    }
}
