use tfplug::{AttributeBuilder, ResourceSchema, SchemaBuilder, State};

use super::{id_attribute, AllQuietResource};
use crate::api::user::{UserRequest, UserResponse};
use crate::helpers::{null_if_none, opt_string, string};
use crate::validators::{pattern, PHONE_NUMBER_PATTERN};

pub struct UserResource;

impl AllQuietResource for UserResource {
    type Api = UserResponse;

    const TYPE_NAME: &'static str = "allquiet_user";
    const DISPLAY_NAME: &'static str = "user";

    fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .description("An AllQuiet user who can be paged")
            .attribute("id", id_attribute())
            .attribute(
                "display_name",
                AttributeBuilder::string("display_name")
                    .required()
                    .description("Full name of the user"),
            )
            .attribute(
                "email",
                AttributeBuilder::string("email")
                    .required()
                    .description("Email address, also used to sign in"),
            )
            .attribute(
                "phone_number",
                AttributeBuilder::string("phone_number")
                    .optional()
                    .description("Phone number in E.164 format, e.g. '+41791234567'")
                    .validator(pattern(PHONE_NUMBER_PATTERN, "a phone number in E.164 format")),
            )
            .attribute(
                "time_zone_id",
                AttributeBuilder::string("time_zone_id")
                    .optional()
                    .description("IANA time zone of the user"),
            )
            .build_resource(0)
    }

    fn map_request(plan: &State) -> UserRequest {
        map_user_request(plan)
    }

    fn map_response_to_state(response: &UserResponse) -> State {
        map_user_response_to_state(response)
    }
}

pub fn map_user_request(plan: &State) -> UserRequest {
    UserRequest {
        display_name: string(&plan.values, "display_name"),
        email: string(&plan.values, "email"),
        phone_number: opt_string(&plan.values, "phone_number"),
        time_zone_id: opt_string(&plan.values, "time_zone_id"),
    }
}

pub fn map_user_response_to_state(response: &UserResponse) -> State {
    let user = &response.user;
    let mut state = State::new();
    state.set("id", response.id.as_str());
    state.set("display_name", user.display_name.as_str());
    state.set("email", user.email.as_str());
    state.set("phone_number", null_if_none(user.phone_number.clone()));
    state.set("time_zone_id", null_if_none(user.time_zone_id.clone()));
    state
}
