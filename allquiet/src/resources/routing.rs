use tfplug::schema::Attribute;
use tfplug::validator::{
    ListElementsValidator, ListLengthValidator, NumberRangeValidator, WholeNumberValidator,
};
use tfplug::{AttributeBuilder, AttributeType, Dynamic, ResourceSchema, SchemaBuilder, State};

use super::{id_attribute, AllQuietResource};
use crate::api::routing::{
    AddAttribute, AttributeCondition, RoutingActions, RoutingChannels, RoutingConditions,
    RoutingRequest, RoutingResponse, RoutingRule, RoutingSchedule,
};
use crate::helpers::{
    map_object_list, null_if_none, object, opt_i64, opt_object, opt_string, string, string_list,
    to_object, to_object_list, to_string_list, Values,
};
use crate::validators::{
    one_of, GuidValidator, TimeOfDayValidator, ATTRIBUTE_OPERATORS, DAYS_OF_WEEK,
    INCIDENT_STATUSES, NOTIFICATION_CHANNELS, RULE_FLOW_CONTROLS, SEVERITIES,
};

pub struct RoutingResource;

fn enum_list(name: &str, allowed: &[&str], description: &str) -> Attribute {
    AttributeBuilder::list(name, AttributeType::String)
        .optional()
        .description(description)
        .validator(Box::new(ListElementsValidator::new(one_of(allowed))))
        .build()
}

fn guid_list(name: &str, description: &str) -> Attribute {
    AttributeBuilder::list(name, AttributeType::String)
        .optional()
        .description(description)
        .validator(Box::new(ListElementsValidator::new(Box::new(GuidValidator))))
        .build()
}

fn conditions_attribute() -> Attribute {
    AttributeBuilder::single_nested(
        "conditions",
        vec![
            enum_list("statuses", &INCIDENT_STATUSES, "Incident statuses: Open or Resolved"),
            enum_list(
                "severities",
                &SEVERITIES,
                "Incident severities: Critical, Warning or Minor",
            ),
            AttributeBuilder::list_nested(
                "attributes",
                vec![
                    AttributeBuilder::string("name")
                        .required()
                        .description("Incident attribute name")
                        .build(),
                    AttributeBuilder::string("operator")
                        .required()
                        .description("Comparison, e.g. '=' or 'contains'")
                        .validator(one_of(&ATTRIBUTE_OPERATORS))
                        .build(),
                    AttributeBuilder::string("value")
                        .optional()
                        .description("Value compared against")
                        .build(),
                ],
            )
            .optional()
            .description("All attribute conditions must match")
            .build(),
            AttributeBuilder::single_nested(
                "schedule",
                vec![
                    enum_list("days_of_week", &DAYS_OF_WEEK, "Days the rule applies on"),
                    AttributeBuilder::string("from")
                        .optional()
                        .description("Start time (HH:mm)")
                        .validator(Box::new(TimeOfDayValidator))
                        .build(),
                    AttributeBuilder::string("until")
                        .optional()
                        .description("End time (HH:mm)")
                        .validator(Box::new(TimeOfDayValidator))
                        .build(),
                ],
            )
            .optional()
            .description("Applies the rule only at certain times")
            .build(),
        ],
    )
    .optional()
    .description("Incidents the rule applies to; all incidents when unset")
    .build()
}

fn channels_attribute() -> Attribute {
    AttributeBuilder::single_nested(
        "channels",
        vec![
            guid_list(
                "outbound_integrations",
                "Outbound integrations notified",
            ),
            guid_list(
                "outbound_integrations_muted",
                "Outbound integrations not notified",
            ),
            enum_list(
                "notification_channels",
                &NOTIFICATION_CHANNELS,
                "Channels used to page: Email, Push, SMS or VoiceCall",
            ),
            enum_list(
                "notification_channels_muted",
                &NOTIFICATION_CHANNELS,
                "Channels never used to page",
            ),
        ],
    )
    .optional()
    .description("Where matching incidents are sent")
    .build()
}

fn actions_attribute() -> Attribute {
    AttributeBuilder::single_nested(
        "actions",
        vec![
            AttributeBuilder::string("change_severity")
                .optional()
                .description("Overrides the incident severity")
                .validator(one_of(&SEVERITIES))
                .build(),
            AttributeBuilder::list_nested(
                "add_attributes",
                vec![
                    AttributeBuilder::string("name").required().build(),
                    AttributeBuilder::string("value").required().build(),
                ],
            )
            .optional()
            .description("Attributes added to the incident")
            .build(),
            guid_list("route_to_teams", "Teams the incident is routed to"),
            guid_list("assign_to_teams", "Teams the incident is assigned to"),
            guid_list(
                "forward_to_outbound_integrations",
                "Outbound integrations the incident is forwarded to",
            ),
            AttributeBuilder::number("delay_actions_in_minutes")
                .optional()
                .description("Delay before the actions run")
                .validator(Box::new(NumberRangeValidator {
                    min: Some(0.0),
                    max: None,
                }))
                .validator(Box::new(WholeNumberValidator))
                .build(),
            AttributeBuilder::string("rule_flow_control")
                .optional()
                .description("Continue evaluating later rules or Skip them")
                .validator(one_of(&RULE_FLOW_CONTROLS))
                .build(),
        ],
    )
    .optional()
    .description("What happens to matching incidents")
    .build()
}

impl AllQuietResource for RoutingResource {
    type Api = RoutingResponse;

    const TYPE_NAME: &'static str = "allquiet_routing";
    const DISPLAY_NAME: &'static str = "routing";

    fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .description("Routing rules deciding who gets paged for a team's incidents")
            .attribute("id", id_attribute())
            .attribute(
                "team_id",
                AttributeBuilder::string("team_id")
                    .required()
                    .description("Team whose incidents are routed")
                    .validator(Box::new(GuidValidator)),
            )
            .attribute(
                "display_name",
                AttributeBuilder::string("display_name")
                    .required()
                    .description("Name of the routing"),
            )
            .attribute(
                "rules",
                AttributeBuilder::list_nested(
                    "rules",
                    vec![conditions_attribute(), channels_attribute(), actions_attribute()],
                )
                .required()
                .description("Rules in evaluation order")
                .validator(Box::new(ListLengthValidator {
                    min: Some(1),
                    max: None,
                })),
            )
            .build_resource(0)
    }

    fn map_request(plan: &State) -> RoutingRequest {
        map_routing_request(plan)
    }

    fn map_response_to_state(response: &RoutingResponse) -> State {
        map_routing_response_to_state(response)
    }
}

pub fn map_routing_request(plan: &State) -> RoutingRequest {
    RoutingRequest {
        team_id: string(&plan.values, "team_id"),
        display_name: string(&plan.values, "display_name"),
        rules: map_object_list(&plan.values, "rules", map_rule).unwrap_or_default(),
    }
}

fn map_rule(rule: &Values) -> RoutingRule {
    RoutingRule {
        conditions: opt_object(rule, "conditions").map(|conditions| RoutingConditions {
            statuses: string_list(conditions, "statuses"),
            severities: string_list(conditions, "severities"),
            attributes: map_object_list(conditions, "attributes", |attribute| {
                AttributeCondition {
                    name: string(attribute, "name"),
                    operator: string(attribute, "operator"),
                    value: opt_string(attribute, "value"),
                }
            }),
            schedule: opt_object(conditions, "schedule").map(|schedule| RoutingSchedule {
                days_of_week: string_list(schedule, "days_of_week"),
                from: opt_string(schedule, "from"),
                until: opt_string(schedule, "until"),
            }),
        }),
        channels: opt_object(rule, "channels").map(|channels| RoutingChannels {
            outbound_integrations: string_list(channels, "outbound_integrations"),
            outbound_integrations_muted: string_list(channels, "outbound_integrations_muted"),
            notification_channels: string_list(channels, "notification_channels"),
            notification_channels_muted: string_list(channels, "notification_channels_muted"),
        }),
        actions: opt_object(rule, "actions").map(|actions| RoutingActions {
            change_severity: opt_string(actions, "change_severity"),
            add_attributes: map_object_list(actions, "add_attributes", |attribute| {
                AddAttribute {
                    name: string(attribute, "name"),
                    value: string(attribute, "value"),
                }
            }),
            route_to_teams: string_list(actions, "route_to_teams"),
            assign_to_teams: string_list(actions, "assign_to_teams"),
            forward_to_outbound_integrations: string_list(
                actions,
                "forward_to_outbound_integrations",
            ),
            delay_actions_in_minutes: opt_i64(actions, "delay_actions_in_minutes"),
            rule_flow_control: opt_string(actions, "rule_flow_control"),
        }),
    }
}

pub fn map_routing_response_to_state(response: &RoutingResponse) -> State {
    let routing = &response.routing;
    let mut state = State::new();
    state.set("id", response.id.as_str());
    state.set("team_id", routing.team_id.as_str());
    state.set("display_name", routing.display_name.as_str());
    state.set("rules", to_object_list(Some(&routing.rules), rule_to_value));
    state
}

fn rule_to_value(rule: &RoutingRule) -> Dynamic {
    object([
        (
            "conditions",
            to_object(rule.conditions.as_ref(), conditions_to_value),
        ),
        (
            "channels",
            to_object(rule.channels.as_ref(), |channels| {
                object([
                    (
                        "outbound_integrations",
                        to_string_list(channels.outbound_integrations.as_ref()),
                    ),
                    (
                        "outbound_integrations_muted",
                        to_string_list(channels.outbound_integrations_muted.as_ref()),
                    ),
                    (
                        "notification_channels",
                        to_string_list(channels.notification_channels.as_ref()),
                    ),
                    (
                        "notification_channels_muted",
                        to_string_list(channels.notification_channels_muted.as_ref()),
                    ),
                ])
            }),
        ),
        ("actions", to_object(rule.actions.as_ref(), actions_to_value)),
    ])
}

fn conditions_to_value(conditions: &RoutingConditions) -> Dynamic {
    object([
        ("statuses", to_string_list(conditions.statuses.as_ref())),
        ("severities", to_string_list(conditions.severities.as_ref())),
        (
            "attributes",
            to_object_list(conditions.attributes.as_ref(), |attribute| {
                object([
                    ("name", Dynamic::from(attribute.name.as_str())),
                    ("operator", Dynamic::from(attribute.operator.as_str())),
                    ("value", null_if_none(attribute.value.clone())),
                ])
            }),
        ),
        (
            "schedule",
            to_object(conditions.schedule.as_ref(), |schedule| {
                object([
                    (
                        "days_of_week",
                        to_string_list(schedule.days_of_week.as_ref()),
                    ),
                    ("from", null_if_none(schedule.from.clone())),
                    ("until", null_if_none(schedule.until.clone())),
                ])
            }),
        ),
    ])
}

fn actions_to_value(actions: &RoutingActions) -> Dynamic {
    object([
        (
            "change_severity",
            null_if_none(actions.change_severity.clone()),
        ),
        (
            "add_attributes",
            to_object_list(actions.add_attributes.as_ref(), |attribute| {
                object([
                    ("name", Dynamic::from(attribute.name.as_str())),
                    ("value", Dynamic::from(attribute.value.as_str())),
                ])
            }),
        ),
        (
            "route_to_teams",
            to_string_list(actions.route_to_teams.as_ref()),
        ),
        (
            "assign_to_teams",
            to_string_list(actions.assign_to_teams.as_ref()),
        ),
        (
            "forward_to_outbound_integrations",
            to_string_list(actions.forward_to_outbound_integrations.as_ref()),
        ),
        (
            "delay_actions_in_minutes",
            null_if_none(actions.delay_actions_in_minutes),
        ),
        (
            "rule_flow_control",
            null_if_none(actions.rule_flow_control.clone()),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn critical_rule() -> Dynamic {
        object([
            (
                "conditions",
                object([
                    ("statuses", Dynamic::Null),
                    ("severities", Dynamic::from(vec!["Critical"])),
                    (
                        "attributes",
                        Dynamic::List(vec![object([
                            ("name", Dynamic::from("service")),
                            ("operator", Dynamic::from("=")),
                            ("value", Dynamic::from("checkout")),
                        ])]),
                    ),
                    ("schedule", Dynamic::Null),
                ]),
            ),
            ("channels", Dynamic::Null),
            (
                "actions",
                object([
                    ("change_severity", Dynamic::Null),
                    (
                        "add_attributes",
                        Dynamic::List(vec![object([
                            ("name", Dynamic::from("routed")),
                            ("value", Dynamic::from("yes")),
                        ])]),
                    ),
                    ("route_to_teams", Dynamic::Null),
                    ("assign_to_teams", Dynamic::Null),
                    ("forward_to_outbound_integrations", Dynamic::List(vec![])),
                    ("delay_actions_in_minutes", Dynamic::Number(5.0)),
                    ("rule_flow_control", Dynamic::from("Skip")),
                ]),
            ),
        ])
    }

    fn catch_all_rule() -> Dynamic {
        object([
            ("conditions", Dynamic::Null),
            (
                "channels",
                object([
                    ("outbound_integrations", Dynamic::Null),
                    ("outbound_integrations_muted", Dynamic::Null),
                    ("notification_channels", Dynamic::from(vec!["Email"])),
                    ("notification_channels_muted", Dynamic::Null),
                ]),
            ),
            ("actions", Dynamic::Null),
        ])
    }

    fn planned() -> State {
        let mut plan = State::new();
        plan.set("id", "r1");
        plan.set("team_id", "t1");
        plan.set("display_name", "Default");
        plan.set(
            "rules",
            Dynamic::List(vec![critical_rule(), catch_all_rule()]),
        );
        plan
    }

    #[test]
    fn rules_keep_evaluation_order() {
        let request = map_routing_request(&planned());
        assert_eq!(request.rules.len(), 2);
        assert!(request.rules[0].conditions.is_some());
        assert!(request.rules[1].conditions.is_none());
        assert_eq!(
            request.rules[0]
                .actions
                .as_ref()
                .and_then(|a| a.delay_actions_in_minutes),
            Some(5)
        );
    }

    #[test]
    fn wire_format_uses_camel_case_and_omits_nulls() {
        let json = serde_json::to_value(map_routing_request(&planned())).unwrap();
        assert_eq!(
            json["rules"][0]["conditions"],
            serde_json::json!({
                "severities": ["Critical"],
                "attributes": [{"name": "service", "operator": "=", "value": "checkout"}]
            })
        );
        assert_eq!(
            json["rules"][0]["actions"]["forwardToOutboundIntegrations"],
            serde_json::json!([])
        );
        assert_eq!(
            json["rules"][1],
            serde_json::json!({"channels": {"notificationChannels": ["Email"]}})
        );
    }

    #[test]
    fn response_reproduces_planned_state() {
        let plan = planned();
        let response = RoutingResponse {
            id: "r1".to_string(),
            routing: map_routing_request(&plan),
        };
        assert_eq!(map_routing_response_to_state(&response), plan);
    }

    #[test]
    fn action_delay_must_be_whole_minutes() {
        use tfplug::validator::Validator;

        let schema = RoutingResource::schema_static();
        let rule = &schema.attributes["rules"].nested.as_ref().unwrap().attributes;
        let actions = &rule["actions"].nested.as_ref().unwrap().attributes;
        let delay = &actions["delay_actions_in_minutes"];

        let mut diagnostics = tfplug::Diagnostics::new();
        for validator in &delay.validators {
            validator.validate(&Dynamic::Number(2.5), &delay.name, &mut diagnostics);
        }
        assert_eq!(diagnostics.errors.len(), 1);
        assert!(diagnostics.errors[0].summary.contains("whole number"));
    }
}
