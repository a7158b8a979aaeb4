use tfplug::{AttributeBuilder, Dynamic, ResourceSchema, SchemaBuilder, State};

use super::{id_attribute, AllQuietResource};
use crate::api::service::{ServiceRequest, ServiceResponse, ServiceTemplate};
use crate::helpers::{map_object_list, null_if_none, object, opt_string, string, to_object_list};

pub struct ServiceResource;

impl AllQuietResource for ServiceResource {
    type Api = ServiceResponse;

    const TYPE_NAME: &'static str = "allquiet_service";
    const DISPLAY_NAME: &'static str = "service";

    fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .description("A service whose health is published on status pages")
            .attribute("id", id_attribute())
            .attribute(
                "display_name",
                AttributeBuilder::string("display_name")
                    .required()
                    .description("Internal name of the service"),
            )
            .attribute(
                "public_title",
                AttributeBuilder::string("public_title")
                    .required()
                    .description("Name shown on status pages"),
            )
            .attribute(
                "public_description",
                AttributeBuilder::string("public_description")
                    .optional()
                    .description("Description shown on status pages"),
            )
            .attribute(
                "templates",
                AttributeBuilder::list_nested(
                    "templates",
                    vec![
                        AttributeBuilder::string("display_name")
                            .required()
                            .description("Name of the template")
                            .build(),
                        AttributeBuilder::string("message")
                            .required()
                            .description("Status update text")
                            .build(),
                    ],
                )
                .optional()
                .description("Canned status update messages"),
            )
            .build_resource(0)
    }

    fn map_request(plan: &State) -> ServiceRequest {
        map_service_request(plan)
    }

    fn map_response_to_state(response: &ServiceResponse) -> State {
        map_service_response_to_state(response)
    }
}

pub fn map_service_request(plan: &State) -> ServiceRequest {
    ServiceRequest {
        display_name: string(&plan.values, "display_name"),
        public_title: string(&plan.values, "public_title"),
        public_description: opt_string(&plan.values, "public_description"),
        templates: map_object_list(&plan.values, "templates", |template| ServiceTemplate {
            display_name: string(template, "display_name"),
            message: string(template, "message"),
        }),
    }
}

pub fn map_service_response_to_state(response: &ServiceResponse) -> State {
    let service = &response.service;
    let mut state = State::new();
    state.set("id", response.id.as_str());
    state.set("display_name", service.display_name.as_str());
    state.set("public_title", service.public_title.as_str());
    state.set(
        "public_description",
        null_if_none(service.public_description.clone()),
    );
    state.set(
        "templates",
        to_object_list(service.templates.as_ref(), |template| {
            object([
                ("display_name", Dynamic::from(template.display_name.as_str())),
                ("message", Dynamic::from(template.message.as_str())),
            ])
        }),
    );
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_keep_their_order() {
        let mut plan = State::new();
        plan.set("id", "s1");
        plan.set("display_name", "checkout");
        plan.set("public_title", "Checkout");
        plan.set_null("public_description");
        plan.set(
            "templates",
            Dynamic::List(vec![
                object([
                    ("display_name", Dynamic::from("Investigating")),
                    ("message", Dynamic::from("We are looking into it")),
                ]),
                object([
                    ("display_name", Dynamic::from("Resolved")),
                    ("message", Dynamic::from("All good again")),
                ]),
            ]),
        );

        let request = map_service_request(&plan);
        let names: Vec<_> = request
            .templates
            .iter()
            .flatten()
            .map(|t| t.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["Investigating", "Resolved"]);

        let response = ServiceResponse {
            id: "s1".to_string(),
            service: request,
        };
        assert_eq!(map_service_response_to_state(&response), plan);
    }
}
