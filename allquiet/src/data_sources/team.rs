use tfplug::{AttributeBuilder, Config, DataSourceSchema, SchemaBuilder, State};

use super::Lookup;
use crate::api::team::TeamResponse;
use crate::api::ApiQueryParams;
use crate::helpers::{null_if_none, string};

pub struct TeamDataSource;

impl Lookup for TeamDataSource {
    type Api = TeamResponse;

    const TYPE_NAME: &'static str = "allquiet_team";
    const DISPLAY_NAME: &'static str = "team";

    fn schema_static() -> DataSourceSchema {
        SchemaBuilder::new()
            .description("Looks up a team by display name")
            .attribute(
                "display_name",
                AttributeBuilder::string("display_name")
                    .required()
                    .description("Exact name of the team"),
            )
            .attribute("id", AttributeBuilder::string("id").computed())
            .attribute(
                "time_zone_id",
                AttributeBuilder::string("time_zone_id").computed(),
            )
            .build_data_source(0)
    }

    fn query(config: &Config) -> ApiQueryParams {
        ApiQueryParams::new().add("displayName", string(&config.values, "display_name"))
    }

    fn describe(config: &Config) -> String {
        format!("display_name {:?}", string(&config.values, "display_name"))
    }

    fn matches(candidate: &TeamResponse, config: &Config) -> bool {
        candidate.team.display_name == string(&config.values, "display_name")
    }

    fn to_state(found: &TeamResponse, _config: &Config) -> State {
        let mut state = State::new();
        state.set("id", found.id.as_str());
        state.set("display_name", found.team.display_name.as_str());
        state.set("time_zone_id", null_if_none(found.team.time_zone_id.clone()));
        state
    }
}
