//! Core value types for tfplug
//!
//! This module provides the Dynamic value tree exchanged with Terraform, the
//! Config and State wrappers handed to resources, and Diagnostics.

use serde::de::{self, IgnoredAny, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Name rmp-serde uses to route a newtype struct to a msgpack extension
const MSGPACK_EXT_STRUCT_NAME: &str = "_ExtStruct";

/// Extension type Terraform uses for unknown values
const UNKNOWN_EXT_TYPE: i8 = 0;

/// Dynamic represents Terraform values that can be of any type
/// Objects and maps share the Map variant; sets share the List variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    /// Explicit null value
    Null,
    Bool(bool),
    /// All numbers are f64 to match Terraform
    Number(f64),
    String(String),
    List(Vec<Dynamic>),
    Map(HashMap<String, Dynamic>),
    /// Value not yet known (during planning)
    Unknown,
}

impl Dynamic {
    pub fn as_string(&self) -> Option<&String> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_string().map(|s| s.as_str())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Dynamic::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Dynamic::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Dynamic>> {
        match self {
            Dynamic::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Dynamic>> {
        match self {
            Dynamic::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    pub fn is_unknown(&self) -> bool {
        match self {
            Dynamic::Unknown => true,
            Dynamic::List(items) => items.iter().any(Dynamic::is_unknown),
            Dynamic::Map(entries) => entries.values().any(Dynamic::is_unknown),
            _ => false,
        }
    }

    /// True when the value is neither null nor (wholly or partially) unknown
    pub fn is_known(&self) -> bool {
        !self.is_null() && !self.is_unknown()
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Map(_) => "map",
            Dynamic::Unknown => "unknown",
        }
    }
}

impl From<String> for Dynamic {
    fn from(s: String) -> Self {
        Dynamic::String(s)
    }
}

impl From<&str> for Dynamic {
    fn from(s: &str) -> Self {
        Dynamic::String(s.to_string())
    }
}

impl From<bool> for Dynamic {
    fn from(b: bool) -> Self {
        Dynamic::Bool(b)
    }
}

impl From<f64> for Dynamic {
    fn from(n: f64) -> Self {
        Dynamic::Number(n)
    }
}

impl From<i64> for Dynamic {
    fn from(n: i64) -> Self {
        Dynamic::Number(n as f64)
    }
}

impl From<i32> for Dynamic {
    fn from(n: i32) -> Self {
        Dynamic::Number(n as f64)
    }
}

impl<T: Into<Dynamic>> From<Vec<T>> for Dynamic {
    fn from(items: Vec<T>) -> Self {
        Dynamic::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Dynamic>> From<Option<T>> for Dynamic {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Dynamic::Null)
    }
}

impl Serialize for Dynamic {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Dynamic::Null => serializer.serialize_unit(),
            Dynamic::Bool(b) => serializer.serialize_bool(*b),
            Dynamic::Number(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Dynamic::String(s) => serializer.serialize_str(s),
            Dynamic::List(l) => l.serialize(serializer),
            Dynamic::Map(m) => m.serialize(serializer),
            Dynamic::Unknown => serializer.serialize_newtype_struct(
                MSGPACK_EXT_STRUCT_NAME,
                &(UNKNOWN_EXT_TYPE, serde_bytes::Bytes::new(&[0])),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct DynamicVisitor;

        impl<'de> Visitor<'de> for DynamicVisitor {
            type Value = Dynamic;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid Dynamic value")
            }

            fn visit_unit<E>(self) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Dynamic, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                Dynamic::deserialize(deserializer)
            }

            // msgpack extension values only ever carry unknowns
            fn visit_newtype_struct<D>(
                self,
                deserializer: D,
            ) -> std::result::Result<Dynamic, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                IgnoredAny::deserialize(deserializer)?;
                Ok(Dynamic::Unknown)
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Number(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::String(value))
            }

            fn visit_seq<V>(self, mut seq: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Dynamic::List(vec))
            }

            fn visit_map<V>(self, mut map: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut hashmap = HashMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    hashmap.insert(key, value);
                }
                Ok(Dynamic::Map(hashmap))
            }
        }

        deserializer.deserialize_any(DynamicVisitor)
    }
}

/// Typed accessors shared by Config and State. Getters return None for
/// absent, null, unknown and mistyped attributes alike.
macro_rules! impl_attribute_values {
    ($ty:ident) => {
        impl $ty {
            pub fn new() -> Self {
                Self {
                    values: HashMap::new(),
                }
            }

            /// Returns the attribute value, treating absent attributes as null
            pub fn get(&self, name: &str) -> &Dynamic {
                self.values.get(name).unwrap_or(&Dynamic::Null)
            }

            pub fn get_string(&self, name: &str) -> Option<String> {
                self.values
                    .get(name)
                    .and_then(|v| v.as_string())
                    .cloned()
            }

            pub fn get_number(&self, name: &str) -> Option<f64> {
                self.values.get(name).and_then(|v| v.as_number())
            }

            pub fn get_bool(&self, name: &str) -> Option<bool> {
                self.values.get(name).and_then(|v| v.as_bool())
            }

            pub fn get_list(&self, name: &str) -> Option<&Vec<Dynamic>> {
                self.values.get(name).and_then(|v| v.as_list())
            }

            pub fn get_map(&self, name: &str) -> Option<&HashMap<String, Dynamic>> {
                self.values.get(name).and_then(|v| v.as_map())
            }

            pub fn set(&mut self, name: &str, value: impl Into<Dynamic>) {
                self.values.insert(name.to_string(), value.into());
            }

            pub fn set_null(&mut self, name: &str) {
                self.values.insert(name.to_string(), Dynamic::Null);
            }
        }

        impl From<HashMap<String, Dynamic>> for $ty {
            fn from(values: HashMap<String, Dynamic>) -> Self {
                Self { values }
            }
        }
    };
}

/// Config represents configuration values of a provider, resource or data source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub values: HashMap<String, Dynamic>,
}

/// State represents stored or planned resource values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    pub values: HashMap<String, Dynamic>,
}

impl_attribute_values!(Config);
impl_attribute_values!(State);

/// AttributePath points at a value nested within a Config or State
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributePathStep {
    AttributeName(String),
    ElementKeyString(String),
    ElementKeyInt(i64),
}

impl AttributePath {
    pub fn new(name: &str) -> Self {
        Self {
            steps: vec![AttributePathStep::AttributeName(name.to_string())],
        }
    }

    pub fn root() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.steps
            .push(AttributePathStep::AttributeName(name.to_string()));
        self
    }

    pub fn index(mut self, idx: i64) -> Self {
        self.steps.push(AttributePathStep::ElementKeyInt(idx));
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.steps
            .push(AttributePathStep::ElementKeyString(key.to_string()));
        self
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                AttributePathStep::AttributeName(name) if i == 0 => write!(f, "{}", name)?,
                AttributePathStep::AttributeName(name) => write!(f, ".{}", name)?,
                AttributePathStep::ElementKeyString(key) => write!(f, "[\"{}\"]", key)?,
                AttributePathStep::ElementKeyInt(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

/// Diagnostic represents a warning or error reported back to Terraform
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub summary: String,
    pub detail: Option<String>,
    pub attribute: Option<AttributePath>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error<S: Into<String>, D: Into<String>>(&mut self, summary: S, detail: Option<D>) {
        self.errors.push(Diagnostic {
            summary: summary.into(),
            detail: detail.map(Into::into),
            attribute: None,
        });
    }

    pub fn add_warning<S: Into<String>, D: Into<String>>(
        &mut self,
        summary: S,
        detail: Option<D>,
    ) {
        self.warnings.push(Diagnostic {
            summary: summary.into(),
            detail: detail.map(Into::into),
            attribute: None,
        });
    }

    pub fn add_attribute_error<S: Into<String>, D: Into<String>>(
        &mut self,
        attribute: AttributePath,
        summary: S,
        detail: Option<D>,
    ) {
        self.errors.push(Diagnostic {
            summary: summary.into(),
            detail: detail.map(Into::into),
            attribute: Some(attribute),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_roundtrips_through_msgpack_extension() {
        let mut values = HashMap::new();
        values.insert("id".to_string(), Dynamic::Unknown);
        values.insert("name".to_string(), Dynamic::String("ops".to_string()));

        let encoded = rmp_serde::encode::to_vec_named(&values).unwrap();
        let decoded: HashMap<String, Dynamic> = rmp_serde::decode::from_slice(&encoded).unwrap();

        assert_eq!(decoded.get("id"), Some(&Dynamic::Unknown));
        assert_eq!(
            decoded.get("name"),
            Some(&Dynamic::String("ops".to_string()))
        );
    }

    #[test]
    fn terraform_unknown_extension_decodes_as_unknown() {
        // fixext1, type 0, payload 0 as emitted by Terraform core
        let bytes = [0xd4, 0x00, 0x00];
        let decoded: Dynamic = rmp_serde::decode::from_slice(&bytes).unwrap();
        assert_eq!(decoded, Dynamic::Unknown);
    }

    #[test]
    fn whole_numbers_encode_as_integers() {
        let encoded = rmp_serde::encode::to_vec(&Dynamic::Number(30.0)).unwrap();
        assert_eq!(encoded, vec![30]);

        let decoded: Dynamic = rmp_serde::decode::from_slice(&encoded).unwrap();
        assert_eq!(decoded, Dynamic::Number(30.0));
    }

    #[test]
    fn nested_unknown_marks_parent_unknown() {
        let value = Dynamic::List(vec![Dynamic::String("a".to_string()), Dynamic::Unknown]);
        assert!(value.is_unknown());
        assert!(!value.is_known());
        assert!(Dynamic::List(vec![]).is_known());
    }

    #[test]
    fn state_getters_ignore_null_and_unknown() {
        let mut state = State::new();
        state.set("display_name", "Platform");
        state.set_null("time_zone_id");
        state.set("id", Dynamic::Unknown);

        assert_eq!(state.get_string("display_name"), Some("Platform".to_string()));
        assert_eq!(state.get_string("time_zone_id"), None);
        assert_eq!(state.get_string("id"), None);
        assert_eq!(state.get("missing"), &Dynamic::Null);
    }

    #[test]
    fn option_conversion_maps_none_to_null() {
        let none: Option<String> = None;
        assert_eq!(Dynamic::from(none), Dynamic::Null);
        assert_eq!(
            Dynamic::from(Some(vec!["a", "b"])),
            Dynamic::List(vec![
                Dynamic::String("a".to_string()),
                Dynamic::String("b".to_string())
            ])
        );
    }

    #[test]
    fn attribute_path_displays_nested_steps() {
        let path = AttributePath::new("rules")
            .index(0)
            .attribute("conditions")
            .key("env");
        assert_eq!(path.to_string(), "rules[0].conditions[\"env\"]");
    }

    #[test]
    fn diagnostics_track_errors_and_warnings() {
        let mut diags = Diagnostics::new();
        diags.add_warning("deprecated", None::<String>);
        assert!(!diags.has_errors());

        let mut other = Diagnostics::new();
        other.add_attribute_error(
            AttributePath::new("team_id"),
            "Invalid GUID",
            Some("not-a-guid"),
        );
        diags.extend(other);

        assert!(diags.has_errors());
        assert_eq!(diags.warnings.len(), 1);
        assert_eq!(
            diags.errors[0].attribute,
            Some(AttributePath::new("team_id"))
        );
    }
}
