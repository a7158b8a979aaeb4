use chrono::DateTime;
use tfplug::validator::ListElementsValidator;
use tfplug::{
    AttributeBuilder, AttributePath, AttributeType, Config, Diagnostics, ResourceSchema,
    SchemaBuilder, State,
};

use super::{id_attribute, AllQuietResource};
use crate::api::maintenance_window::{MaintenanceWindowRequest, MaintenanceWindowResponse};
use crate::helpers::{null_if_none, opt_string, string, string_list, to_string_list};
use crate::validators::{DateTimeValidator, GuidValidator};

pub struct MaintenanceWindowResource;

impl AllQuietResource for MaintenanceWindowResource {
    type Api = MaintenanceWindowResponse;

    const TYPE_NAME: &'static str = "allquiet_maintenance_window";
    const DISPLAY_NAME: &'static str = "maintenance window";

    fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .description("A time range during which a team's incidents do not page")
            .attribute("id", id_attribute())
            .attribute(
                "team_id",
                AttributeBuilder::string("team_id")
                    .required()
                    .description("Team under maintenance")
                    .validator(Box::new(GuidValidator)),
            )
            .attribute(
                "description",
                AttributeBuilder::string("description")
                    .optional()
                    .description("Reason for the maintenance"),
            )
            .attribute(
                "start",
                AttributeBuilder::string("start")
                    .required()
                    .description("Start of the window (RFC 3339)")
                    .validator(Box::new(DateTimeValidator)),
            )
            .attribute(
                "end",
                AttributeBuilder::string("end")
                    .required()
                    .description("End of the window (RFC 3339), after start")
                    .validator(Box::new(DateTimeValidator)),
            )
            .attribute(
                "integration_ids",
                AttributeBuilder::list("integration_ids", AttributeType::String)
                    .optional()
                    .description("Restricts the window to these integrations")
                    .validator(Box::new(ListElementsValidator::new(Box::new(GuidValidator)))),
            )
            .build_resource(0)
    }

    fn map_request(plan: &State) -> MaintenanceWindowRequest {
        map_maintenance_window_request(plan)
    }

    fn map_response_to_state(response: &MaintenanceWindowResponse) -> State {
        map_maintenance_window_response_to_state(response)
    }
}

/// Checks that the window ends after it starts. Unknown or malformed bounds
/// are left to the attribute validators.
pub fn validate_window(config: &Config) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    let parse = |name: &str| {
        opt_string(&config.values, name)
            .and_then(|value| DateTime::parse_from_rfc3339(&value).ok())
    };

    if let (Some(start), Some(end)) = (parse("start"), parse("end")) {
        if end <= start {
            diagnostics.add_attribute_error(
                AttributePath::new("end"),
                "Invalid maintenance window",
                Some(format!("end ({}) must be after start ({})", end, start)),
            );
        }
    }
    diagnostics
}

pub fn map_maintenance_window_request(plan: &State) -> MaintenanceWindowRequest {
    MaintenanceWindowRequest {
        team_id: string(&plan.values, "team_id"),
        description: opt_string(&plan.values, "description"),
        start: string(&plan.values, "start"),
        end: string(&plan.values, "end"),
        integration_ids: string_list(&plan.values, "integration_ids"),
    }
}

pub fn map_maintenance_window_response_to_state(response: &MaintenanceWindowResponse) -> State {
    let window = &response.window;
    let mut state = State::new();
    state.set("id", response.id.as_str());
    state.set("team_id", window.team_id.as_str());
    state.set("description", null_if_none(window.description.clone()));
    state.set("start", window.start.as_str());
    state.set("end", window.end.as_str());
    state.set(
        "integration_ids",
        to_string_list(window.integration_ids.as_ref()),
    );
    state
}
