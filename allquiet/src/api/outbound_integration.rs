//! Outbound integrations: `/outbound-integration`

use serde::{Deserialize, Serialize};

use super::common::ApiResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundIntegrationRequest {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(rename = "type")]
    pub integration_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggers_only_on_forwarded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_updating_after_forwarding: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundIntegrationResponse {
    pub id: String,
    #[serde(flatten)]
    pub integration: OutboundIntegrationRequest,
}

impl ApiResource for OutboundIntegrationResponse {
    type Request = OutboundIntegrationRequest;

    fn api_path() -> &'static str {
        "/outbound-integration"
    }

    fn id(&self) -> &str {
        &self.id
    }
}
