use tfplug::plan_modifier::RequiresReplaceIfChanged;
use tfplug::schema::Attribute;
use tfplug::validator::{
    ListElementsValidator, ListLengthValidator, NumberRangeValidator, WholeNumberValidator,
};
use tfplug::{AttributeBuilder, AttributeType, Dynamic, ResourceSchema, SchemaBuilder, State};

use super::{id_attribute, AllQuietResource};
use crate::api::team_escalations::{
    EscalationSchedule, EscalationTier, Rotation, RotationMember, RotationSettings,
    ScheduleSettings, TeamEscalationsRequest, TeamEscalationsResponse,
};
use crate::helpers::{
    map_object_list, null_if_none, object, opt_bool, opt_i64, opt_object, opt_string, string,
    string_list, to_object, to_object_list, to_string_list, Values,
};
use crate::validators::{
    one_of, DateValidator, GuidValidator, TimeOfDayValidator, DAYS_OF_WEEK,
    ESCALATION_STOP_MODES, ROTATION_CUSTOM_UNITS, ROTATION_REPEATS, SEVERITIES,
};

pub struct TeamEscalationsResource;

fn minutes(name: &str, description: &str) -> Attribute {
    AttributeBuilder::number(name)
        .optional()
        .description(description)
        .validator(Box::new(NumberRangeValidator {
            min: Some(0.0),
            max: None,
        }))
        .validator(Box::new(WholeNumberValidator))
        .build()
}

fn schedule_settings_attribute() -> Attribute {
    AttributeBuilder::single_nested(
        "schedule_settings",
        vec![
            AttributeBuilder::list("selected_days", AttributeType::String)
                .optional()
                .description("Days the schedule is active on")
                .validator(Box::new(ListElementsValidator::new(one_of(&DAYS_OF_WEEK))))
                .build(),
            AttributeBuilder::string("start")
                .optional()
                .description("Start of the active hours (HH:mm)")
                .validator(Box::new(TimeOfDayValidator))
                .build(),
            AttributeBuilder::string("end")
                .optional()
                .description("End of the active hours (HH:mm)")
                .validator(Box::new(TimeOfDayValidator))
                .build(),
        ],
    )
    .optional()
    .description("Restricts the schedule to certain days and hours")
    .build()
}

fn rotation_settings_attribute() -> Attribute {
    AttributeBuilder::single_nested(
        "rotation_settings",
        vec![
            AttributeBuilder::string("repeats")
                .optional()
                .description("Rotation interval: Daily, Weekly, BiWeekly, Monthly or Custom")
                .validator(one_of(&ROTATION_REPEATS))
                .build(),
            AttributeBuilder::string("starts_on_date_time")
                .optional()
                .description("Date the rotation starts on (YYYY-MM-DD)")
                .validator(Box::new(DateValidator))
                .build(),
            AttributeBuilder::string("starts_on_day_of_week")
                .optional()
                .description("Day of week the rotation hands over")
                .validator(one_of(&DAYS_OF_WEEK))
                .build(),
            AttributeBuilder::string("starts_on_time")
                .optional()
                .description("Time of day the rotation hands over (HH:mm)")
                .validator(Box::new(TimeOfDayValidator))
                .build(),
            AttributeBuilder::string("custom_repeat_unit")
                .optional()
                .description("Unit of a Custom rotation interval: Hours, Days or Weeks")
                .validator(one_of(&ROTATION_CUSTOM_UNITS))
                .build(),
            AttributeBuilder::number("custom_repeat_value")
                .optional()
                .description("Length of a Custom rotation interval")
                .validator(Box::new(NumberRangeValidator {
                    min: Some(1.0),
                    max: None,
                }))
                .validator(Box::new(WholeNumberValidator))
                .build(),
            AttributeBuilder::number("auto_rotation_size")
                .optional()
                .description("Number of members on call per rotation")
                .validator(Box::new(NumberRangeValidator {
                    min: Some(1.0),
                    max: None,
                }))
                .validator(Box::new(WholeNumberValidator))
                .build(),
        ],
    )
    .optional()
    .description("How the rotations hand over")
    .build()
}

fn rotations_attribute() -> Attribute {
    AttributeBuilder::list_nested(
        "rotations",
        vec![AttributeBuilder::list_nested(
            "members",
            vec![AttributeBuilder::string("team_membership_id")
                .required()
                .description("Team membership on call in this rotation")
                .validator(Box::new(GuidValidator))
                .build()],
        )
        .optional()
        .description("Members on call during this rotation")
        .build()],
    )
    .optional()
    .description("Rotations, in hand over order")
    .build()
}

fn escalation_tier_attributes() -> Vec<Attribute> {
    vec![
        AttributeBuilder::bool("auto_escalation_enabled")
            .optional()
            .description("Escalate to the next tier when nobody responds")
            .build(),
        minutes(
            "auto_escalation_after_minutes",
            "Minutes without response before escalating",
        ),
        AttributeBuilder::list("auto_escalation_severities", AttributeType::String)
            .optional()
            .description("Severities that escalate: Critical, Warning or Minor")
            .validator(Box::new(ListElementsValidator::new(one_of(&SEVERITIES))))
            .build(),
        AttributeBuilder::string("auto_escalation_stop_mode")
            .optional()
            .description("Incident state that stops escalation: Acknowledged, Resolved or Never")
            .validator(one_of(&ESCALATION_STOP_MODES))
            .build(),
        AttributeBuilder::number("repeats")
            .optional()
            .description("How often the tier pages again")
            .validator(Box::new(NumberRangeValidator {
                min: Some(0.0),
                max: None,
            }))
            .validator(Box::new(WholeNumberValidator))
            .build(),
        minutes("repeats_after_minutes", "Minutes between repeated pages"),
        AttributeBuilder::list_nested(
            "schedules",
            vec![
                schedule_settings_attribute(),
                rotation_settings_attribute(),
                rotations_attribute(),
            ],
        )
        .optional()
        .description("On-call schedules of the tier")
        .build(),
    ]
}

impl AllQuietResource for TeamEscalationsResource {
    type Api = TeamEscalationsResponse;

    const TYPE_NAME: &'static str = "allquiet_team_escalations";
    const DISPLAY_NAME: &'static str = "team escalations";

    fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .description(
                "Escalation tiers of a team. A team has at most one escalations resource.",
            )
            .attribute("id", id_attribute())
            .attribute(
                "team_id",
                AttributeBuilder::string("team_id")
                    .required()
                    .description("Team the escalations belong to")
                    .validator(Box::new(GuidValidator))
                    .plan_modifier(Box::new(RequiresReplaceIfChanged)),
            )
            .attribute(
                "escalation_tiers",
                AttributeBuilder::list_nested("escalation_tiers", escalation_tier_attributes())
                    .required()
                    .description("Tiers in escalation order")
                    .validator(Box::new(ListLengthValidator {
                        min: Some(1),
                        max: None,
                    })),
            )
            .build_resource(0)
    }

    fn map_request(plan: &State) -> TeamEscalationsRequest {
        map_team_escalations_request(plan)
    }

    fn map_response_to_state(response: &TeamEscalationsResponse) -> State {
        map_team_escalations_response_to_state(response)
    }
}

pub fn map_team_escalations_request(plan: &State) -> TeamEscalationsRequest {
    TeamEscalationsRequest {
        team_id: string(&plan.values, "team_id"),
        escalation_tiers: map_object_list(&plan.values, "escalation_tiers", map_tier)
            .unwrap_or_default(),
    }
}

fn map_tier(tier: &Values) -> EscalationTier {
    EscalationTier {
        auto_escalation_enabled: opt_bool(tier, "auto_escalation_enabled"),
        auto_escalation_after_minutes: opt_i64(tier, "auto_escalation_after_minutes"),
        auto_escalation_severities: string_list(tier, "auto_escalation_severities"),
        auto_escalation_stop_mode: opt_string(tier, "auto_escalation_stop_mode"),
        repeats: opt_i64(tier, "repeats"),
        repeats_after_minutes: opt_i64(tier, "repeats_after_minutes"),
        schedules: map_object_list(tier, "schedules", map_schedule),
    }
}

fn map_schedule(schedule: &Values) -> EscalationSchedule {
    EscalationSchedule {
        schedule_settings: opt_object(schedule, "schedule_settings").map(|settings| {
            ScheduleSettings {
                selected_days: string_list(settings, "selected_days"),
                start: opt_string(settings, "start"),
                end: opt_string(settings, "end"),
            }
        }),
        rotation_settings: opt_object(schedule, "rotation_settings").map(|settings| {
            RotationSettings {
                repeats: opt_string(settings, "repeats"),
                starts_on_date_time: opt_string(settings, "starts_on_date_time"),
                starts_on_day_of_week: opt_string(settings, "starts_on_day_of_week"),
                starts_on_time: opt_string(settings, "starts_on_time"),
                custom_repeat_unit: opt_string(settings, "custom_repeat_unit"),
                custom_repeat_value: opt_i64(settings, "custom_repeat_value"),
                auto_rotation_size: opt_i64(settings, "auto_rotation_size"),
            }
        }),
        rotations: map_object_list(schedule, "rotations", |rotation| Rotation {
            members: map_object_list(rotation, "members", |member| RotationMember {
                team_membership_id: string(member, "team_membership_id"),
            }),
        }),
    }
}

pub fn map_team_escalations_response_to_state(response: &TeamEscalationsResponse) -> State {
    let escalations = &response.escalations;
    let mut state = State::new();
    state.set("id", response.id.as_str());
    state.set("team_id", escalations.team_id.as_str());
    state.set(
        "escalation_tiers",
        to_object_list(Some(&escalations.escalation_tiers), tier_to_value),
    );
    state
}

fn tier_to_value(tier: &EscalationTier) -> Dynamic {
    object([
        (
            "auto_escalation_enabled",
            null_if_none(tier.auto_escalation_enabled),
        ),
        (
            "auto_escalation_after_minutes",
            null_if_none(tier.auto_escalation_after_minutes),
        ),
        (
            "auto_escalation_severities",
            to_string_list(tier.auto_escalation_severities.as_ref()),
        ),
        (
            "auto_escalation_stop_mode",
            null_if_none(tier.auto_escalation_stop_mode.clone()),
        ),
        ("repeats", null_if_none(tier.repeats)),
        (
            "repeats_after_minutes",
            null_if_none(tier.repeats_after_minutes),
        ),
        (
            "schedules",
            to_object_list(tier.schedules.as_ref(), schedule_to_value),
        ),
    ])
}

fn schedule_to_value(schedule: &EscalationSchedule) -> Dynamic {
    object([
        (
            "schedule_settings",
            to_object(schedule.schedule_settings.as_ref(), |settings| {
                object([
                    (
                        "selected_days",
                        to_string_list(settings.selected_days.as_ref()),
                    ),
                    ("start", null_if_none(settings.start.clone())),
                    ("end", null_if_none(settings.end.clone())),
                ])
            }),
        ),
        (
            "rotation_settings",
            to_object(schedule.rotation_settings.as_ref(), |settings| {
                object([
                    ("repeats", null_if_none(settings.repeats.clone())),
                    (
                        "starts_on_date_time",
                        null_if_none(settings.starts_on_date_time.clone()),
                    ),
                    (
                        "starts_on_day_of_week",
                        null_if_none(settings.starts_on_day_of_week.clone()),
                    ),
                    (
                        "starts_on_time",
                        null_if_none(settings.starts_on_time.clone()),
                    ),
                    (
                        "custom_repeat_unit",
                        null_if_none(settings.custom_repeat_unit.clone()),
                    ),
                    (
                        "custom_repeat_value",
                        null_if_none(settings.custom_repeat_value),
                    ),
                    (
                        "auto_rotation_size",
                        null_if_none(settings.auto_rotation_size),
                    ),
                ])
            }),
        ),
        (
            "rotations",
            to_object_list(schedule.rotations.as_ref(), |rotation| {
                object([(
                    "members",
                    to_object_list(rotation.members.as_ref(), |member| {
                        object([(
                            "team_membership_id",
                            Dynamic::from(member.team_membership_id.as_str()),
                        )])
                    }),
                )])
            }),
        ),
    ])
}
