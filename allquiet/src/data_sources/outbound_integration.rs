use tfplug::{AttributeBuilder, Config, DataSourceSchema, SchemaBuilder, State};

use super::Lookup;
use crate::api::outbound_integration::OutboundIntegrationResponse;
use crate::api::ApiQueryParams;
use crate::helpers::string;

pub struct OutboundIntegrationDataSource;

impl Lookup for OutboundIntegrationDataSource {
    type Api = OutboundIntegrationResponse;

    const TYPE_NAME: &'static str = "allquiet_outbound_integration";
    const DISPLAY_NAME: &'static str = "outbound integration";

    fn schema_static() -> DataSourceSchema {
        SchemaBuilder::new()
            .description("Looks up an outbound integration by display name")
            .attribute(
                "display_name",
                AttributeBuilder::string("display_name")
                    .required()
                    .description("Exact name of the outbound integration"),
            )
            .attribute("id", AttributeBuilder::string("id").computed())
            .attribute("type", AttributeBuilder::string("type").computed())
            .build_data_source(0)
    }

    fn query(config: &Config) -> ApiQueryParams {
        ApiQueryParams::new().add("displayName", string(&config.values, "display_name"))
    }

    fn describe(config: &Config) -> String {
        format!("display_name {:?}", string(&config.values, "display_name"))
    }

    fn matches(candidate: &OutboundIntegrationResponse, config: &Config) -> bool {
        candidate.integration.display_name == string(&config.values, "display_name")
    }

    fn to_state(found: &OutboundIntegrationResponse, _config: &Config) -> State {
        let mut state = State::new();
        state.set("id", found.id.as_str());
        state.set("display_name", found.integration.display_name.as_str());
        state.set("type", found.integration.integration_type.as_str());
        state
    }
}
