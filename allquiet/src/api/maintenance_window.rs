//! Maintenance windows: `/maintenance-window`

use serde::{Deserialize, Serialize};

use super::common::ApiResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceWindowRequest {
    pub team_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceWindowResponse {
    pub id: String,
    #[serde(flatten)]
    pub window: MaintenanceWindowRequest,
}

impl ApiResource for MaintenanceWindowResponse {
    type Request = MaintenanceWindowRequest;

    fn api_path() -> &'static str {
        "/maintenance-window"
    }

    fn id(&self) -> &str {
        &self.id
    }
}
