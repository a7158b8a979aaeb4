use tfplug::{AttributeBuilder, Config, DataSourceSchema, SchemaBuilder, State};

use super::Lookup;
use crate::api::service::ServiceResponse;
use crate::api::ApiQueryParams;
use crate::helpers::string;

pub struct ServiceDataSource;

impl Lookup for ServiceDataSource {
    type Api = ServiceResponse;

    const TYPE_NAME: &'static str = "allquiet_service";
    const DISPLAY_NAME: &'static str = "service";

    fn schema_static() -> DataSourceSchema {
        SchemaBuilder::new()
            .description("Looks up a service by display name")
            .attribute(
                "display_name",
                AttributeBuilder::string("display_name")
                    .required()
                    .description("Exact internal name of the service"),
            )
            .attribute("id", AttributeBuilder::string("id").computed())
            .attribute(
                "public_title",
                AttributeBuilder::string("public_title").computed(),
            )
            .build_data_source(0)
    }

    fn query(config: &Config) -> ApiQueryParams {
        ApiQueryParams::new().add("displayName", string(&config.values, "display_name"))
    }

    fn describe(config: &Config) -> String {
        format!("display_name {:?}", string(&config.values, "display_name"))
    }

    fn matches(candidate: &ServiceResponse, config: &Config) -> bool {
        candidate.service.display_name == string(&config.values, "display_name")
    }

    fn to_state(found: &ServiceResponse, _config: &Config) -> State {
        let mut state = State::new();
        state.set("id", found.id.as_str());
        state.set("display_name", found.service.display_name.as_str());
        state.set("public_title", found.service.public_title.as_str());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sources::LookupDataSource;
    use crate::resources::test_support::create_test_client;
    use mockito::{Matcher, Server};
    use tfplug::request::ReadDataSourceRequest;
    use tfplug::{Context, DataSourceV2};

    #[tokio::test(flavor = "multi_thread")]
    async fn looks_up_service_by_display_name() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/service")
            .match_query(Matcher::UrlEncoded(
                "displayName".to_string(),
                "Checkout API".to_string(),
            ))
            .with_status(200)
            .with_body(r#"[{"id":"s1","displayName":"Checkout API","publicTitle":"Checkout"},{"id":"s2","displayName":"Checkout API v2","publicTitle":"Checkout"}]"#)
            .create_async()
            .await;

        let mut config = Config::new();
        config.set("display_name", "Checkout API");
        let data_source = LookupDataSource::<ServiceDataSource>::new(create_test_client(&server.url()));
        let response = data_source
            .read(ReadDataSourceRequest {
                context: Context::new(),
                config,
            })
            .await;

        mock.assert_async().await;
        assert!(!response.diagnostics.has_errors());
        let state = response.state.unwrap();
        let mut expected = State::new();
        expected.set("id", "s1");
        expected.set("display_name", "Checkout API");
        expected.set("public_title", "Checkout");
        assert_eq!(state, expected);
    }
}
