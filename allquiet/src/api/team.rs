//! Teams: `/team`

use serde::{Deserialize, Serialize};

use super::common::ApiResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRequest {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_engagement_report_settings: Option<IncidentEngagementReportSettings>,
}

/// Weekly report of incident engagement sent to the team
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentEngagementReportSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamResponse {
    pub id: String,
    #[serde(flatten)]
    pub team: TeamRequest,
}

impl ApiResource for TeamResponse {
    type Request = TeamRequest;

    fn api_path() -> &'static str {
        "/team"
    }

    fn id(&self) -> &str {
        &self.id
    }
}
