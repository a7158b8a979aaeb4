//! Inbound integrations: `/integration`

use serde::{Deserialize, Serialize};

use super::common::ApiResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationRequest {
    pub display_name: String,
    pub team_id: String,
    #[serde(rename = "type")]
    pub integration_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_muted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_inbound_email_enabled: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationResponse {
    pub id: String,
    /// Assigned by the API; alerts are posted to this URL
    pub webhook_url: Option<String>,
    #[serde(flatten)]
    pub integration: IntegrationRequest,
}

impl ApiResource for IntegrationResponse {
    type Request = IntegrationRequest;

    fn api_path() -> &'static str {
        "/integration"
    }

    fn id(&self) -> &str {
        &self.id
    }
}
