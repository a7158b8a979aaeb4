//! Public status pages: `/status-page`

use serde::{Deserialize, Serialize};

use super::common::ApiResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPageRequest {
    pub display_name: String,
    pub public_title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_company_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_uptime_history: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_groups: Option<Vec<ServiceGroup>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceGroup {
    pub public_display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPageResponse {
    pub id: String,
    #[serde(flatten)]
    pub status_page: StatusPageRequest,
}

impl ApiResource for StatusPageResponse {
    type Request = StatusPageRequest;

    fn api_path() -> &'static str {
        "/status-page"
    }

    fn id(&self) -> &str {
        &self.id
    }
}
