use tfplug::{AttributeBuilder, AttributeType, ResourceSchema, SchemaBuilder, State};

use super::{id_attribute, AllQuietResource};
use crate::api::team::{IncidentEngagementReportSettings, TeamRequest, TeamResponse};
use crate::helpers::{
    null_if_none, object, opt_object, opt_string, string, string_list, to_object, to_string_list,
};
use crate::validators::{one_of, TimeOfDayValidator, DAYS_OF_WEEK};

pub struct TeamResource;

impl AllQuietResource for TeamResource {
    type Api = TeamResponse;

    const TYPE_NAME: &'static str = "allquiet_team";
    const DISPLAY_NAME: &'static str = "team";

    fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .description("An AllQuiet team. Incidents are routed to teams.")
            .attribute("id", id_attribute())
            .attribute(
                "display_name",
                AttributeBuilder::string("display_name")
                    .required()
                    .description("Name of the team"),
            )
            .attribute(
                "time_zone_id",
                AttributeBuilder::string("time_zone_id")
                    .optional()
                    .description("IANA time zone of the team, e.g. 'Europe/Zurich'"),
            )
            .attribute(
                "labels",
                AttributeBuilder::list("labels", AttributeType::String)
                    .optional()
                    .description("Free form labels"),
            )
            .attribute(
                "incident_engagement_report_settings",
                AttributeBuilder::single_nested(
                    "incident_engagement_report_settings",
                    vec![
                        AttributeBuilder::string("day_of_week")
                            .required()
                            .description("Day the report is sent: mon, tue, wed, thu, fri, sat or sun")
                            .validator(one_of(&DAYS_OF_WEEK))
                            .build(),
                        AttributeBuilder::string("time")
                            .required()
                            .description("Time of day the report is sent (HH:mm)")
                            .validator(Box::new(TimeOfDayValidator))
                            .build(),
                    ],
                )
                .optional()
                .description("Weekly incident engagement report"),
            )
            .build_resource(0)
    }

    fn map_request(plan: &State) -> TeamRequest {
        map_team_request(plan)
    }

    fn map_response_to_state(response: &TeamResponse) -> State {
        map_team_response_to_state(response)
    }
}

pub fn map_team_request(plan: &State) -> TeamRequest {
    TeamRequest {
        display_name: string(&plan.values, "display_name"),
        time_zone_id: opt_string(&plan.values, "time_zone_id"),
        labels: string_list(&plan.values, "labels"),
        incident_engagement_report_settings: opt_object(
            &plan.values,
            "incident_engagement_report_settings",
        )
        .map(|settings| IncidentEngagementReportSettings {
            day_of_week: opt_string(settings, "day_of_week"),
            time: opt_string(settings, "time"),
        }),
    }
}

pub fn map_team_response_to_state(response: &TeamResponse) -> State {
    let team = &response.team;
    let mut state = State::new();
    state.set("id", response.id.as_str());
    state.set("display_name", team.display_name.as_str());
    state.set("time_zone_id", null_if_none(team.time_zone_id.clone()));
    state.set("labels", to_string_list(team.labels.as_ref()));
    state.set(
        "incident_engagement_report_settings",
        to_object(
            team.incident_engagement_report_settings.as_ref(),
            |settings| {
                object([
                    ("day_of_week", null_if_none(settings.day_of_week.clone())),
                    ("time", null_if_none(settings.time.clone())),
                ])
            },
        ),
    );
    state
}
