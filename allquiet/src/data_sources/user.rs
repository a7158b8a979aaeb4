use tfplug::{AttributeBuilder, Config, DataSourceSchema, SchemaBuilder, State};

use super::Lookup;
use crate::api::user::UserResponse;
use crate::api::ApiQueryParams;
use crate::helpers::string;

pub struct UserDataSource;

impl Lookup for UserDataSource {
    type Api = UserResponse;

    const TYPE_NAME: &'static str = "allquiet_user";
    const DISPLAY_NAME: &'static str = "user";

    fn schema_static() -> DataSourceSchema {
        SchemaBuilder::new()
            .description("Looks up a user by email address")
            .attribute(
                "email",
                AttributeBuilder::string("email")
                    .required()
                    .description("Email address of the user, compared case-insensitively"),
            )
            .attribute("id", AttributeBuilder::string("id").computed())
            .attribute(
                "display_name",
                AttributeBuilder::string("display_name").computed(),
            )
            .build_data_source(0)
    }

    fn query(config: &Config) -> ApiQueryParams {
        ApiQueryParams::new().add("email", string(&config.values, "email"))
    }

    fn describe(config: &Config) -> String {
        format!("email {:?}", string(&config.values, "email"))
    }

    fn matches(candidate: &UserResponse, config: &Config) -> bool {
        candidate
            .user
            .email
            .eq_ignore_ascii_case(&string(&config.values, "email"))
    }

    /// Echoes the configured email so differently cased input stays stable
    fn to_state(found: &UserResponse, config: &Config) -> State {
        let mut state = State::new();
        state.set("id", found.id.as_str());
        state.set("email", string(&config.values, "email"));
        state.set("display_name", found.user.display_name.as_str());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::user::UserRequest;

    #[test]
    fn email_match_ignores_case() {
        let mut config = Config::new();
        config.set("email", "Ada@Example.com");

        let candidate = UserResponse {
            id: "u1".to_string(),
            user: UserRequest {
                display_name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                ..Default::default()
            },
        };
        assert!(UserDataSource::matches(&candidate, &config));

        let state = UserDataSource::to_state(&candidate, &config);
        assert_eq!(state.get_string("email"), Some("Ada@Example.com".to_string()));
        assert_eq!(
            UserDataSource::query(&config).to_query_string(),
            "?email=Ada%40Example.com"
        );
    }
}
