//! Escalation tiers of a team: `/team-escalations`
//!
//! A team has a single escalations object holding an ordered list of tiers.
//! Each tier pages the on-call members of its schedules and, when enabled,
//! escalates to the next tier after a delay.

use serde::{Deserialize, Serialize};

use super::common::ApiResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEscalationsRequest {
    pub team_id: String,
    #[serde(default)]
    pub escalation_tiers: Vec<EscalationTier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationTier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_escalation_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_escalation_after_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_escalation_severities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_escalation_stop_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeats: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeats_after_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedules: Option<Vec<EscalationSchedule>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationSchedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_settings: Option<ScheduleSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_settings: Option<RotationSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotations: Option<Vec<Rotation>>,
}

/// Days and hours during which the schedule is active
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_days: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// How often the on-call rotation hands over to the next rotation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeats: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_on_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_on_day_of_week: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_on_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_repeat_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_repeat_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_rotation_size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<RotationMember>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationMember {
    pub team_membership_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEscalationsResponse {
    pub id: String,
    #[serde(flatten)]
    pub escalations: TeamEscalationsRequest,
}

impl ApiResource for TeamEscalationsResponse {
    type Request = TeamEscalationsRequest;

    fn api_path() -> &'static str {
        "/team-escalations"
    }

    fn id(&self) -> &str {
        &self.id
    }
}
