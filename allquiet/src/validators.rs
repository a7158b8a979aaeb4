//! Attribute validators and the enumerations accepted by the AllQuiet API

use chrono::{DateTime, NaiveDate, NaiveTime};
use tfplug::validator::{OneOfValidator, StringPatternValidator, Validator};
use tfplug::{Diagnostics, Dynamic};

pub const DAYS_OF_WEEK: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];
pub const SEVERITIES: [&str; 3] = ["Critical", "Warning", "Minor"];
pub const INCIDENT_STATUSES: [&str; 2] = ["Open", "Resolved"];
pub const TEAM_ROLES: [&str; 2] = ["Member", "Administrator"];
pub const ESCALATION_STOP_MODES: [&str; 3] = ["Acknowledged", "Resolved", "Never"];
pub const ROTATION_REPEATS: [&str; 5] = ["Daily", "Weekly", "BiWeekly", "Monthly", "Custom"];
pub const ROTATION_CUSTOM_UNITS: [&str; 3] = ["Hours", "Days", "Weeks"];
pub const ATTRIBUTE_OPERATORS: [&str; 6] = [
    "=",
    "!=",
    "contains",
    "not_contains",
    "starts_with",
    "ends_with",
];
pub const NOTIFICATION_CHANNELS: [&str; 4] = ["Email", "Push", "SMS", "VoiceCall"];
pub const RULE_FLOW_CONTROLS: [&str; 2] = ["Continue", "Skip"];

pub const INTEGRATION_TYPES: [&str; 16] = [
    "Webhook",
    "Email",
    "AmazonCloudWatch",
    "AzureMonitor",
    "Checkly",
    "Datadog",
    "Elastic",
    "GoogleCloudMonitoring",
    "Grafana",
    "NewRelic",
    "Opsgenie",
    "PagerDuty",
    "Pingdom",
    "Prometheus",
    "Sentry",
    "UptimeRobot",
];

pub const OUTBOUND_INTEGRATION_TYPES: [&str; 6] = [
    "Slack",
    "MicrosoftTeams",
    "Webhook",
    "Discord",
    "Jira",
    "ServiceNow",
];

pub const PHONE_NUMBER_PATTERN: &str = r"^\+[1-9]\d{1,14}$";
pub const SLUG_PATTERN: &str = r"^[a-z0-9]+(-[a-z0-9]+)*$";

pub fn one_of(allowed: &[&str]) -> Box<dyn Validator> {
    Box::new(OneOfValidator::new(allowed.iter().copied()))
}

/// Regex validator for a pattern known at compile time. A pattern that does
/// not compile reports itself on every validation instead of panicking.
pub fn pattern(pattern: &str, description: &str) -> Box<dyn Validator> {
    match StringPatternValidator::new(pattern, description) {
        Ok(validator) => Box::new(validator),
        Err(e) => Box::new(BrokenPattern(e.to_string())),
    }
}

struct BrokenPattern(String);

impl Validator for BrokenPattern {
    fn validate(&self, _value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        diagnostics.add_error(
            format!("{} cannot be validated", attribute_path),
            Some(format!("Invalid validation pattern: {}", self.0)),
        );
    }
}

/// Identifiers of AllQuiet objects are GUIDs
pub struct GuidValidator;

impl Validator for GuidValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            if uuid::Uuid::try_parse(s).is_err() {
                diagnostics.add_error(
                    format!("{} must be a valid GUID", attribute_path),
                    Some(format!("Got '{}'", s)),
                );
            }
        }
    }
}

/// RFC 3339 timestamps such as `2024-05-01T08:00:00Z`
pub struct DateTimeValidator;

impl Validator for DateTimeValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            if let Err(e) = DateTime::parse_from_rfc3339(s) {
                diagnostics.add_error(
                    format!("{} must be an RFC 3339 date and time", attribute_path),
                    Some(format!("Got '{}': {}", s, e)),
                );
            }
        }
    }
}

/// Calendar dates in `YYYY-MM-DD` form
pub struct DateValidator;

impl Validator for DateValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_err() {
                diagnostics.add_error(
                    format!("{} must be a date in YYYY-MM-DD format", attribute_path),
                    Some(format!("Got '{}'", s)),
                );
            }
        }
    }
}

/// Times of day in 24h `HH:mm` form
pub struct TimeOfDayValidator;

impl Validator for TimeOfDayValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            if s.len() != 5 || NaiveTime::parse_from_str(s, "%H:%M").is_err() {
                diagnostics.add_error(
                    format!("{} must be a time of day in HH:mm format", attribute_path),
                    Some(format!("Got '{}'", s)),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfplug::validator::ListElementsValidator;

    fn check(validator: &dyn Validator, value: &str) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        validator.validate(
            &Dynamic::String(value.to_string()),
            "value",
            &mut diagnostics,
        );
        diagnostics
    }

    #[test]
    fn guid_validator_accepts_hyphenated_guids() {
        assert!(!check(&GuidValidator, "2b8f7e2c-3d7a-4bde-9c1e-6f6c1d4e5a10").has_errors());

        let diagnostics = check(&GuidValidator, "team-1");
        assert_eq!(diagnostics.errors[0].summary, "value must be a valid GUID");
    }

    #[test]
    fn guid_validator_ignores_null() {
        let mut diagnostics = Diagnostics::new();
        GuidValidator.validate(&Dynamic::Null, "team_id", &mut diagnostics);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn date_time_validator_requires_offset() {
        assert!(!check(&DateTimeValidator, "2024-05-01T08:00:00Z").has_errors());
        assert!(!check(&DateTimeValidator, "2024-05-01T08:00:00+02:00").has_errors());
        assert!(check(&DateTimeValidator, "2024-05-01 08:00").has_errors());
    }

    #[test]
    fn time_of_day_validator_requires_two_digit_hours() {
        assert!(!check(&TimeOfDayValidator, "08:30").has_errors());
        assert!(!check(&TimeOfDayValidator, "23:59").has_errors());
        assert!(check(&TimeOfDayValidator, "8:30").has_errors());
        assert!(check(&TimeOfDayValidator, "24:00").has_errors());
        assert!(check(&TimeOfDayValidator, "08:30:00").has_errors());
    }

    #[test]
    fn date_validator_rejects_impossible_dates() {
        assert!(!check(&DateValidator, "2024-02-29").has_errors());
        assert!(check(&DateValidator, "2023-02-29").has_errors());
    }

    #[test]
    fn patterns_compile_and_match() {
        let phone = pattern(PHONE_NUMBER_PATTERN, "an E.164 phone number");
        assert!(!check(phone.as_ref(), "+41791234567").has_errors());
        assert!(check(phone.as_ref(), "0791234567").has_errors());

        let slug = pattern(SLUG_PATTERN, "lowercase words separated by hyphens");
        assert!(!check(slug.as_ref(), "acme-status").has_errors());
        assert!(check(slug.as_ref(), "Acme Status").has_errors());
    }

    #[test]
    fn broken_pattern_reports_instead_of_panicking() {
        let broken = pattern("([", "never matches");
        assert!(check(broken.as_ref(), "anything").has_errors());
    }

    #[test]
    fn enum_validator_composes_with_list_elements() {
        let validator = ListElementsValidator::new(one_of(&SEVERITIES));
        let mut diagnostics = Diagnostics::new();
        validator.validate(
            &Dynamic::List(vec![
                Dynamic::String("Critical".to_string()),
                Dynamic::String("Urgent".to_string()),
            ]),
            "severities",
            &mut diagnostics,
        );
        assert_eq!(diagnostics.errors.len(), 1);
        assert_eq!(
            diagnostics.errors[0].summary,
            "severities[1] must be one of: Critical, Warning, Minor"
        );
    }
}
