use crate::types::Dynamic;
use serde_json::{json, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(HashMap<String, AttributeType>),
}

impl AttributeType {
    /// Terraform's JSON type constraint representation
    pub fn to_json(&self) -> Value {
        match self {
            AttributeType::String => json!("string"),
            AttributeType::Number => json!("number"),
            AttributeType::Bool => json!("bool"),
            AttributeType::List(elem) => json!(["list", elem.to_json()]),
            AttributeType::Set(elem) => json!(["set", elem.to_json()]),
            AttributeType::Map(elem) => json!(["map", elem.to_json()]),
            AttributeType::Object(attrs) => {
                let attrs: serde_json::Map<String, Value> = attrs
                    .iter()
                    .map(|(name, ty)| (name.clone(), ty.to_json()))
                    .collect();
                json!(["object", attrs])
            }
        }
    }

    /// Bytes placed in the `type` field of a schema attribute
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_json().to_string().into_bytes()
    }

    /// Checks a value against this type. Null and unknown match any type.
    pub fn accepts(&self, value: &Dynamic) -> bool {
        match (value, self) {
            (Dynamic::Null, _) | (Dynamic::Unknown, _) => true,
            (Dynamic::String(_), AttributeType::String) => true,
            (Dynamic::Number(_), AttributeType::Number) => true,
            (Dynamic::Bool(_), AttributeType::Bool) => true,
            (Dynamic::List(items), AttributeType::List(elem))
            | (Dynamic::List(items), AttributeType::Set(elem)) => {
                items.iter().all(|item| elem.accepts(item))
            }
            (Dynamic::Map(entries), AttributeType::Map(elem)) => {
                entries.values().all(|item| elem.accepts(item))
            }
            (Dynamic::Map(entries), AttributeType::Object(attrs)) => entries
                .iter()
                .all(|(name, item)| attrs.get(name).is_some_and(|ty| ty.accepts(item))),
            _ => false,
        }
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeType::String => write!(f, "string"),
            AttributeType::Number => write!(f, "number"),
            AttributeType::Bool => write!(f, "bool"),
            AttributeType::List(elem) => write!(f, "list({})", elem),
            AttributeType::Set(elem) => write!(f, "set({})", elem),
            AttributeType::Map(elem) => write!(f, "map({})", elem),
            AttributeType::Object(_) => write!(f, "object"),
        }
    }
}
