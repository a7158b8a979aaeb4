//! Routing rules of a team: `/routing`
//!
//! Rules are evaluated in order. A rule matches an incident through its
//! conditions, then selects notification channels and runs actions.

use serde::{Deserialize, Serialize};

use super::common::ApiResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingRequest {
    pub team_id: String,
    pub display_name: String,
    #[serde(default)]
    pub rules: Vec<RoutingRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<RoutingConditions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<RoutingChannels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<RoutingActions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<AttributeCondition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<RoutingSchedule>,
}

/// Matches an incident attribute, e.g. `service = checkout`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeCondition {
    pub name: String,
    pub operator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingSchedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingChannels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbound_integrations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbound_integrations_muted: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_channels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_channels_muted: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingActions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_attributes: Option<Vec<AddAttribute>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_to_teams: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign_to_teams: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_to_outbound_integrations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_actions_in_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_flow_control: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAttribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingResponse {
    pub id: String,
    #[serde(flatten)]
    pub routing: RoutingRequest,
}

impl ApiResource for RoutingResponse {
    type Request = RoutingRequest;

    fn api_path() -> &'static str {
        "/routing"
    }

    fn id(&self) -> &str {
        &self.id
    }
}
