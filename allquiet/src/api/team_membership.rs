//! Team memberships: `/team-membership`

use serde::{Deserialize, Serialize};

use super::common::ApiResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMembershipRequest {
    pub team_id: String,
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMembershipResponse {
    pub id: String,
    #[serde(flatten)]
    pub membership: TeamMembershipRequest,
}

impl ApiResource for TeamMembershipResponse {
    type Request = TeamMembershipRequest;

    fn api_path() -> &'static str {
        "/team-membership"
    }

    fn id(&self) -> &str {
        &self.id
    }
}
