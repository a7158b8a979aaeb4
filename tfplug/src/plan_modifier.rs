use crate::types::{Diagnostics, Dynamic};

#[derive(Debug, Clone)]
pub struct PlanModifyRequest {
    pub state: Dynamic,
    pub plan: Dynamic,
    pub config: Dynamic,
    pub attribute_path: String,
}

#[derive(Debug, Clone)]
pub struct PlanModifyResponse {
    pub plan_value: Dynamic,
    pub requires_replace: bool,
    pub diagnostics: Diagnostics,
}

/// Trait for modifying terraform plan behavior
///
/// Plan modifiers run after Terraform has generated a plan and can:
/// - Modify the planned value
/// - Mark an attribute as requiring replacement
/// - Add warnings or errors to the plan
pub trait PlanModifier: Send + Sync {
    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse;
}

/// Marks an attribute as requiring replacement when it changes on an
/// existing resource
pub struct RequiresReplaceIfChanged;

impl PlanModifier for RequiresReplaceIfChanged {
    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        let requires_replace = !matches!(
            (&request.state, &request.plan),
            (Dynamic::Null, _) | (Dynamic::Unknown, _) | (_, Dynamic::Unknown)
        ) && !values_equal(&request.state, &request.plan);

        PlanModifyResponse {
            plan_value: request.plan,
            requires_replace,
            diagnostics: Diagnostics::new(),
        }
    }
}

/// Uses the prior state value when the planned value is unknown
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        let plan_value = match (&request.plan, &request.state) {
            (Dynamic::Unknown, Dynamic::Null) => request.plan,
            (Dynamic::Unknown, state) => state.clone(),
            _ => request.plan,
        };

        PlanModifyResponse {
            plan_value,
            requires_replace: false,
            diagnostics: Diagnostics::new(),
        }
    }
}

pub struct RequiresReplaceIf<F>
where
    F: Fn(&PlanModifyRequest) -> bool + Send + Sync,
{
    predicate: F,
    description: String,
}

impl<F> RequiresReplaceIf<F>
where
    F: Fn(&PlanModifyRequest) -> bool + Send + Sync,
{
    pub fn new(predicate: F, description: impl Into<String>) -> Self {
        Self {
            predicate,
            description: description.into(),
        }
    }
}

impl<F> PlanModifier for RequiresReplaceIf<F>
where
    F: Fn(&PlanModifyRequest) -> bool + Send + Sync,
{
    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        let mut diagnostics = Diagnostics::new();
        let requires_replace = (self.predicate)(&request);

        if requires_replace {
            diagnostics.add_warning(
                format!(
                    "Attribute '{}' requires resource replacement",
                    request.attribute_path
                ),
                Some(&self.description),
            );
        }

        PlanModifyResponse {
            plan_value: request.plan,
            requires_replace,
            diagnostics,
        }
    }
}

/// Structural equality with a tolerance for float noise
pub fn values_equal(a: &Dynamic, b: &Dynamic) -> bool {
    match (a, b) {
        (Dynamic::Null, Dynamic::Null) => true,
        (Dynamic::Unknown, Dynamic::Unknown) => true,
        (Dynamic::Bool(a), Dynamic::Bool(b)) => a == b,
        (Dynamic::Number(a), Dynamic::Number(b)) => (a - b).abs() < f64::EPSILON,
        (Dynamic::String(a), Dynamic::String(b)) => a == b,
        (Dynamic::List(a), Dynamic::List(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Dynamic::Map(a), Dynamic::Map(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|v2| values_equal(v, v2)))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn request(state: Dynamic, plan: Dynamic) -> PlanModifyRequest {
        PlanModifyRequest {
            config: plan.clone(),
            state,
            plan,
            attribute_path: "team_id".to_string(),
        }
    }

    #[test]
    fn requires_replace_if_changed_does_not_trigger_on_same_value() {
        let response = RequiresReplaceIfChanged.modify_plan(request(
            Dynamic::String("team-a".to_string()),
            Dynamic::String("team-a".to_string()),
        ));

        assert!(!response.requires_replace);
        assert_eq!(response.diagnostics.errors.len(), 0);
    }

    #[test]
    fn requires_replace_if_changed_triggers_on_different_value() {
        let response = RequiresReplaceIfChanged.modify_plan(request(
            Dynamic::String("team-a".to_string()),
            Dynamic::String("team-b".to_string()),
        ));

        assert!(response.requires_replace);
    }

    #[test]
    fn requires_replace_if_changed_ignores_creation() {
        let response = RequiresReplaceIfChanged
            .modify_plan(request(Dynamic::Null, Dynamic::String("team-a".to_string())));

        assert!(!response.requires_replace);
    }

    #[test]
    fn requires_replace_if_changed_ignores_unknown_values() {
        let response = RequiresReplaceIfChanged
            .modify_plan(request(Dynamic::String("team-a".to_string()), Dynamic::Unknown));

        assert!(!response.requires_replace);
    }

    #[test]
    fn use_state_for_unknown_preserves_state_when_unknown() {
        let response = UseStateForUnknown.modify_plan(request(
            Dynamic::String("existing-id".to_string()),
            Dynamic::Unknown,
        ));

        assert_eq!(
            response.plan_value,
            Dynamic::String("existing-id".to_string())
        );
        assert!(!response.requires_replace);
    }

    #[test]
    fn use_state_for_unknown_stays_unknown_on_create() {
        let response = UseStateForUnknown.modify_plan(request(Dynamic::Null, Dynamic::Unknown));

        assert_eq!(response.plan_value, Dynamic::Unknown);
    }

    #[test]
    fn use_state_for_unknown_uses_plan_when_known() {
        let response = UseStateForUnknown.modify_plan(request(
            Dynamic::String("existing-value".to_string()),
            Dynamic::String("new-value".to_string()),
        ));

        assert_eq!(response.plan_value, Dynamic::String("new-value".to_string()));
    }

    #[test]
    fn values_equal_handles_nested_values() {
        let list1 = Dynamic::List(vec![Dynamic::String("a".to_string()), Dynamic::Number(1.0)]);
        let list2 = Dynamic::List(vec![Dynamic::String("a".to_string()), Dynamic::Number(1.0)]);
        let list3 = Dynamic::List(vec![Dynamic::String("b".to_string()), Dynamic::Number(1.0)]);
        assert!(values_equal(&list1, &list2));
        assert!(!values_equal(&list1, &list3));

        let mut map1 = HashMap::new();
        map1.insert("key".to_string(), list1);
        let mut map2 = HashMap::new();
        map2.insert("key".to_string(), list3);
        assert!(!values_equal(&Dynamic::Map(map1), &Dynamic::Map(map2)));
    }

    #[test]
    fn requires_replace_if_triggers_on_condition() {
        let modifier = RequiresReplaceIf::new(
            |req| {
                matches!((&req.state, &req.plan),
                    (Dynamic::String(old), Dynamic::String(new)) if old != new && new.is_empty()
                )
            },
            "Clearing the value recreates the resource",
        );

        let response = modifier.modify_plan(request(
            Dynamic::String("has-value".to_string()),
            Dynamic::String(String::new()),
        ));
        assert!(response.requires_replace);
        assert_eq!(response.diagnostics.warnings.len(), 1);

        let response = modifier.modify_plan(request(
            Dynamic::String(String::new()),
            Dynamic::String("new-value".to_string()),
        ));
        assert!(!response.requires_replace);
        assert_eq!(response.diagnostics.warnings.len(), 0);
    }
}
