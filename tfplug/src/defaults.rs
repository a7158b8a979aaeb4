//! Default value providers for attributes
//!
//! Defaults are evaluated during planning for optional + computed attributes
//! whose configuration value is null.

use crate::types::Dynamic;

pub struct DefaultRequest {
    pub attribute_path: String,
}

pub struct DefaultResponse {
    pub value: Dynamic,
}

pub trait Default: Send + Sync {
    fn description(&self) -> String;

    fn default_value(&self, request: DefaultRequest) -> DefaultResponse;
}

/// StaticDefault provides a static default value
pub struct StaticDefault {
    value: Dynamic,
}

impl StaticDefault {
    pub fn create(value: Dynamic) -> Box<dyn Default> {
        Box::new(Self { value })
    }

    pub fn string(value: &str) -> Box<dyn Default> {
        Self::create(Dynamic::String(value.to_string()))
    }

    pub fn number(value: f64) -> Box<dyn Default> {
        Self::create(Dynamic::Number(value))
    }

    pub fn bool(value: bool) -> Box<dyn Default> {
        Self::create(Dynamic::Bool(value))
    }

    pub fn empty_list() -> Box<dyn Default> {
        Self::create(Dynamic::List(Vec::new()))
    }
}

impl Default for StaticDefault {
    fn description(&self) -> String {
        format!("static default value: {:?}", self.value)
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: self.value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> DefaultRequest {
        DefaultRequest {
            attribute_path: "show_uptime_history".to_string(),
        }
    }

    #[test]
    fn static_bool_default_returns_value() {
        let default = StaticDefault::bool(true);
        assert_eq!(default.default_value(request()).value, Dynamic::Bool(true));
    }

    #[test]
    fn static_string_default_describes_itself() {
        let default = StaticDefault::string("UTC");
        assert!(default.description().contains("UTC"));
        assert_eq!(
            default.default_value(request()).value,
            Dynamic::String("UTC".to_string())
        );
    }

    #[test]
    fn empty_list_default_is_not_null() {
        let default = StaticDefault::empty_list();
        assert_eq!(default.default_value(request()).value, Dynamic::List(vec![]));
    }
}
