use tfplug::defaults::StaticDefault;
use tfplug::validator::ListElementsValidator;
use tfplug::{AttributeBuilder, AttributeType, Dynamic, ResourceSchema, SchemaBuilder, State};

use super::{id_attribute, AllQuietResource};
use crate::api::status_page::{ServiceGroup, StatusPageRequest, StatusPageResponse};
use crate::helpers::{
    map_object_list, null_if_none, object, opt_bool, opt_string, string, string_list,
    to_object_list, to_string_list,
};
use crate::validators::{pattern, GuidValidator, SLUG_PATTERN};

pub struct StatusPageResource;

fn service_ids(name: &str, description: &str) -> AttributeBuilder {
    AttributeBuilder::list(name, AttributeType::String)
        .optional()
        .description(description)
        .validator(Box::new(ListElementsValidator::new(Box::new(GuidValidator))))
}

impl AllQuietResource for StatusPageResource {
    type Api = StatusPageResponse;

    const TYPE_NAME: &'static str = "allquiet_status_page";
    const DISPLAY_NAME: &'static str = "status page";

    fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .description("A public status page")
            .attribute("id", id_attribute())
            .attribute(
                "display_name",
                AttributeBuilder::string("display_name")
                    .required()
                    .description("Internal name of the status page"),
            )
            .attribute(
                "public_title",
                AttributeBuilder::string("public_title")
                    .required()
                    .description("Title shown on the page"),
            )
            .attribute(
                "slug",
                AttributeBuilder::string("slug")
                    .required()
                    .description("URL path of the page, lowercase words separated by hyphens")
                    .validator(pattern(SLUG_PATTERN, "lowercase words separated by hyphens")),
            )
            .attribute(
                "public_description",
                AttributeBuilder::string("public_description").optional(),
            )
            .attribute(
                "public_company_url",
                AttributeBuilder::string("public_company_url").optional(),
            )
            .attribute(
                "public_company_name",
                AttributeBuilder::string("public_company_name").optional(),
            )
            .attribute(
                "time_zone_id",
                AttributeBuilder::string("time_zone_id")
                    .optional()
                    .description("IANA time zone used to display times"),
            )
            .attribute(
                "show_uptime_history",
                AttributeBuilder::bool("show_uptime_history")
                    .optional()
                    .computed()
                    .description("Show the uptime bars of each service. Defaults to true.")
                    .default(StaticDefault::bool(true)),
            )
            .attribute(
                "services",
                service_ids("services", "Services listed outside of any group"),
            )
            .attribute(
                "service_groups",
                AttributeBuilder::list_nested(
                    "service_groups",
                    vec![
                        AttributeBuilder::string("public_display_name")
                            .required()
                            .description("Heading of the group")
                            .build(),
                        AttributeBuilder::string("public_description")
                            .optional()
                            .build(),
                        service_ids("services", "Services in the group").build(),
                    ],
                )
                .optional()
                .description("Groups of services, in display order"),
            )
            .build_resource(0)
    }

    fn map_request(plan: &State) -> StatusPageRequest {
        map_status_page_request(plan)
    }

    fn map_response_to_state(response: &StatusPageResponse) -> State {
        map_status_page_response_to_state(response)
    }
}

pub fn map_status_page_request(plan: &State) -> StatusPageRequest {
    let values = &plan.values;
    StatusPageRequest {
        display_name: string(values, "display_name"),
        public_title: string(values, "public_title"),
        slug: string(values, "slug"),
        public_description: opt_string(values, "public_description"),
        public_company_url: opt_string(values, "public_company_url"),
        public_company_name: opt_string(values, "public_company_name"),
        time_zone_id: opt_string(values, "time_zone_id"),
        show_uptime_history: opt_bool(values, "show_uptime_history"),
        services: string_list(values, "services"),
        service_groups: map_object_list(values, "service_groups", |group| ServiceGroup {
            public_display_name: string(group, "public_display_name"),
            public_description: opt_string(group, "public_description"),
            services: string_list(group, "services"),
        }),
    }
}

pub fn map_status_page_response_to_state(response: &StatusPageResponse) -> State {
    let page = &response.status_page;
    let mut state = State::new();
    state.set("id", response.id.as_str());
    state.set("display_name", page.display_name.as_str());
    state.set("public_title", page.public_title.as_str());
    state.set("slug", page.slug.as_str());
    state.set(
        "public_description",
        null_if_none(page.public_description.clone()),
    );
    state.set(
        "public_company_url",
        null_if_none(page.public_company_url.clone()),
    );
    state.set(
        "public_company_name",
        null_if_none(page.public_company_name.clone()),
    );
    state.set("time_zone_id", null_if_none(page.time_zone_id.clone()));
    state.set(
        "show_uptime_history",
        null_if_none(page.show_uptime_history),
    );
    state.set("services", to_string_list(page.services.as_ref()));
    state.set(
        "service_groups",
        to_object_list(page.service_groups.as_ref(), |group| {
            object([
                (
                    "public_display_name",
                    Dynamic::from(group.public_display_name.as_str()),
                ),
                (
                    "public_description",
                    null_if_none(group.public_description.clone()),
                ),
                ("services", to_string_list(group.services.as_ref())),
            ])
        }),
    );
    state
}
