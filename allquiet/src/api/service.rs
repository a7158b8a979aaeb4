//! Services shown on status pages: `/service`

use serde::{Deserialize, Serialize};

use super::common::ApiResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub display_name: String,
    pub public_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<Vec<ServiceTemplate>>,
}

/// Canned status update message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTemplate {
    pub display_name: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: String,
    #[serde(flatten)]
    pub service: ServiceRequest,
}

impl ApiResource for ServiceResponse {
    type Request = ServiceRequest;

    fn api_path() -> &'static str {
        "/service"
    }

    fn id(&self) -> &str {
        &self.id
    }
}
