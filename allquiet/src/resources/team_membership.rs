use tfplug::plan_modifier::RequiresReplaceIfChanged;
use tfplug::validator::{ListElementsValidator, ListLengthValidator};
use tfplug::{AttributeBuilder, AttributeType, ResourceSchema, SchemaBuilder, State};

use super::{id_attribute, AllQuietResource};
use crate::api::team_membership::{TeamMembershipRequest, TeamMembershipResponse};
use crate::helpers::{string, string_list, to_string_list};
use crate::validators::{one_of, GuidValidator, TEAM_ROLES};

pub struct TeamMembershipResource;

impl AllQuietResource for TeamMembershipResource {
    type Api = TeamMembershipResponse;

    const TYPE_NAME: &'static str = "allquiet_team_membership";
    const DISPLAY_NAME: &'static str = "team membership";

    fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .description("Membership of a user in a team")
            .attribute("id", id_attribute())
            .attribute(
                "team_id",
                AttributeBuilder::string("team_id")
                    .required()
                    .description("Team the user belongs to. Changing it recreates the membership.")
                    .validator(Box::new(GuidValidator))
                    .plan_modifier(Box::new(RequiresReplaceIfChanged)),
            )
            .attribute(
                "user_id",
                AttributeBuilder::string("user_id")
                    .required()
                    .description("Member of the team. Changing it recreates the membership.")
                    .validator(Box::new(GuidValidator))
                    .plan_modifier(Box::new(RequiresReplaceIfChanged)),
            )
            .attribute(
                "roles",
                AttributeBuilder::list("roles", AttributeType::String)
                    .required()
                    .description("Roles of the user in the team: Member or Administrator")
                    .validator(Box::new(ListLengthValidator {
                        min: Some(1),
                        max: None,
                    }))
                    .validator(Box::new(ListElementsValidator::new(one_of(&TEAM_ROLES)))),
            )
            .build_resource(0)
    }

    fn map_request(plan: &State) -> TeamMembershipRequest {
        map_team_membership_request(plan)
    }

    fn map_response_to_state(response: &TeamMembershipResponse) -> State {
        map_team_membership_response_to_state(response)
    }
}

pub fn map_team_membership_request(plan: &State) -> TeamMembershipRequest {
    TeamMembershipRequest {
        team_id: string(&plan.values, "team_id"),
        user_id: string(&plan.values, "user_id"),
        roles: string_list(&plan.values, "roles").unwrap_or_default(),
    }
}

pub fn map_team_membership_response_to_state(response: &TeamMembershipResponse) -> State {
    let membership = &response.membership;
    let mut state = State::new();
    state.set("id", response.id.as_str());
    state.set("team_id", membership.team_id.as_str());
    state.set("user_id", membership.user_id.as_str());
    state.set("roles", to_string_list(Some(&membership.roles)));
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_and_user_force_replacement() {
        let schema = TeamMembershipResource::schema_static();
        assert_eq!(schema.attributes["team_id"].plan_modifiers.len(), 1);
        assert_eq!(schema.attributes["user_id"].plan_modifiers.len(), 1);
        assert!(schema.attributes["roles"].plan_modifiers.is_empty());
    }

    #[test]
    fn roles_round_trip_in_order() {
        let mut plan = State::new();
        plan.set("id", "m1");
        plan.set("team_id", "t1");
        plan.set("user_id", "u1");
        plan.set("roles", vec!["Administrator", "Member"]);

        let request = map_team_membership_request(&plan);
        assert_eq!(request.roles, vec!["Administrator", "Member"]);

        let response = TeamMembershipResponse {
            id: "m1".to_string(),
            membership: request,
        };
        assert_eq!(map_team_membership_response_to_state(&response), plan);
    }
}
