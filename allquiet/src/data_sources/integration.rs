use tfplug::{AttributeBuilder, Config, DataSourceSchema, SchemaBuilder, State};

use super::Lookup;
use crate::api::integration::IntegrationResponse;
use crate::api::ApiQueryParams;
use crate::helpers::{null_if_none, opt_string, string};
use crate::validators::GuidValidator;

pub struct IntegrationDataSource;

impl Lookup for IntegrationDataSource {
    type Api = IntegrationResponse;

    const TYPE_NAME: &'static str = "allquiet_integration";
    const DISPLAY_NAME: &'static str = "integration";

    fn schema_static() -> DataSourceSchema {
        SchemaBuilder::new()
            .description("Looks up an inbound integration by display name")
            .attribute(
                "display_name",
                AttributeBuilder::string("display_name")
                    .required()
                    .description("Exact name of the integration"),
            )
            .attribute(
                "team_id",
                AttributeBuilder::string("team_id")
                    .optional()
                    .description("Restricts the search to one team")
                    .validator(Box::new(GuidValidator)),
            )
            .attribute("id", AttributeBuilder::string("id").computed())
            .attribute("type", AttributeBuilder::string("type").computed())
            .build_data_source(0)
    }

    fn query(config: &Config) -> ApiQueryParams {
        ApiQueryParams::new()
            .add("displayName", string(&config.values, "display_name"))
            .add_optional("teamId", opt_string(&config.values, "team_id"))
    }

    fn describe(config: &Config) -> String {
        match opt_string(&config.values, "team_id") {
            Some(team_id) => format!(
                "display_name {:?} in team {}",
                string(&config.values, "display_name"),
                team_id
            ),
            None => format!("display_name {:?}", string(&config.values, "display_name")),
        }
    }

    fn matches(candidate: &IntegrationResponse, config: &Config) -> bool {
        let integration = &candidate.integration;
        integration.display_name == string(&config.values, "display_name")
            && opt_string(&config.values, "team_id")
                .map_or(true, |team_id| integration.team_id == team_id)
    }

    fn to_state(found: &IntegrationResponse, config: &Config) -> State {
        let mut state = State::new();
        state.set("id", found.id.as_str());
        state.set("display_name", found.integration.display_name.as_str());
        state.set("team_id", null_if_none(opt_string(&config.values, "team_id")));
        state.set("type", found.integration.integration_type.as_str());
        state
    }
}
