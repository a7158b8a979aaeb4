//! Schema definitions and builders
//!
//! Attributes are declared with [`AttributeBuilder`] and collected into a
//! resource or data source schema by [`SchemaBuilder`]. Nested attributes
//! (objects and lists of objects) carry their own attribute maps.

use crate::defaults::Default as AttributeDefault;
use crate::plan_modifier::PlanModifier;
use crate::provider::{DataSourceSchema, ResourceSchema};
use crate::validator::Validator;
use std::collections::HashMap;
use std::sync::Arc;

pub use crate::attribute_type::AttributeType;

/// How the objects of a nested attribute are grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestingMode {
    Single,
    List,
    Set,
    Map,
}

#[derive(Debug, Clone)]
pub struct NestedAttributes {
    pub nesting: NestingMode,
    pub attributes: HashMap<String, Attribute>,
}

#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub deprecated: bool,
    pub validators: Vec<Arc<dyn Validator>>,
    pub plan_modifiers: Vec<Arc<dyn PlanModifier>>,
    pub default: Option<Arc<dyn AttributeDefault>>,
    pub nested: Option<NestedAttributes>,
}

impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field("validators", &self.validators.len())
            .field("plan_modifiers", &self.plan_modifiers.len())
            .field("default", &self.default.is_some())
            .field("nested", &self.nested)
            .finish()
    }
}

impl Attribute {
    /// The value type of this attribute, derived from the nested attributes
    /// when present
    pub fn value_type(&self) -> AttributeType {
        match &self.nested {
            None => self.r#type.clone(),
            Some(nested) => {
                let object = AttributeType::Object(
                    nested
                        .attributes
                        .iter()
                        .map(|(name, attr)| (name.clone(), attr.value_type()))
                        .collect(),
                );
                match nested.nesting {
                    NestingMode::Single => object,
                    NestingMode::List => AttributeType::List(Box::new(object)),
                    NestingMode::Set => AttributeType::Set(Box::new(object)),
                    NestingMode::Map => AttributeType::Map(Box::new(object)),
                }
            }
        }
    }
}

pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    fn new(name: &str, r#type: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                deprecated: false,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
                default: None,
                nested: None,
            },
        }
    }

    fn nested(name: &str, nesting: NestingMode, attributes: Vec<Attribute>) -> Self {
        let mut builder = Self::new(name, AttributeType::Object(HashMap::new()));
        builder.attribute.nested = Some(NestedAttributes {
            nesting,
            attributes: attributes
                .into_iter()
                .map(|attr| (attr.name.clone(), attr))
                .collect(),
        });
        builder.attribute.r#type = builder.attribute.value_type();
        builder
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, AttributeType::Number)
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn list(name: &str, element: AttributeType) -> Self {
        Self::new(name, AttributeType::List(Box::new(element)))
    }

    pub fn set(name: &str, element: AttributeType) -> Self {
        Self::new(name, AttributeType::Set(Box::new(element)))
    }

    pub fn map(name: &str, element: AttributeType) -> Self {
        Self::new(name, AttributeType::Map(Box::new(element)))
    }

    /// A single nested object
    pub fn single_nested(name: &str, attributes: Vec<Attribute>) -> Self {
        Self::nested(name, NestingMode::Single, attributes)
    }

    /// An ordered list of nested objects
    pub fn list_nested(name: &str, attributes: Vec<Attribute>) -> Self {
        Self::nested(name, NestingMode::List, attributes)
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self.attribute.computed = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self.attribute.required = false;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.attribute.deprecated = true;
        self
    }

    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.attribute.validators.push(Arc::from(validator));
        self
    }

    pub fn plan_modifier(mut self, modifier: Box<dyn PlanModifier>) -> Self {
        self.attribute.plan_modifiers.push(Arc::from(modifier));
        self
    }

    /// Defaults only apply to optional + computed attributes
    pub fn default(mut self, default: Box<dyn AttributeDefault>) -> Self {
        self.attribute.default = Some(Arc::from(default));
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

#[derive(Default)]
pub struct SchemaBuilder {
    description: String,
    attributes: HashMap<String, Attribute>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, name: &str, builder: AttributeBuilder) -> Self {
        let mut attribute = builder.build();
        attribute.name = name.to_string();
        self.attributes.insert(name.to_string(), attribute);
        self
    }

    pub fn build_resource(self, version: i64) -> ResourceSchema {
        ResourceSchema {
            version,
            description: self.description,
            attributes: self.attributes,
        }
    }

    pub fn build_data_source(self, version: i64) -> DataSourceSchema {
        DataSourceSchema {
            version,
            description: self.description,
            attributes: self.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan_modifier::UseStateForUnknown;

    #[test]
    fn builder_sets_flags() {
        let attr = AttributeBuilder::string("api_key")
            .optional()
            .sensitive()
            .description("API key")
            .build();

        assert!(attr.optional);
        assert!(attr.sensitive);
        assert!(!attr.required);
        assert_eq!(attr.description, "API key");
    }

    #[test]
    fn computed_attribute_keeps_plan_modifiers() {
        let attr = AttributeBuilder::string("id")
            .computed()
            .plan_modifier(Box::new(UseStateForUnknown))
            .build();

        assert!(attr.computed);
        assert_eq!(attr.plan_modifiers.len(), 1);
    }

    #[test]
    fn list_nested_value_type_is_list_of_objects() {
        let attr = AttributeBuilder::list_nested(
            "templates",
            vec![
                AttributeBuilder::string("display_name").required().build(),
                AttributeBuilder::string("message").required().build(),
            ],
        )
        .optional()
        .build();

        match attr.value_type() {
            AttributeType::List(elem) => match *elem {
                AttributeType::Object(attrs) => {
                    assert_eq!(attrs.len(), 2);
                    assert_eq!(attrs.get("message"), Some(&AttributeType::String));
                }
                other => panic!("Expected object element, got {:?}", other),
            },
            other => panic!("Expected list type, got {:?}", other),
        }
    }

    #[test]
    fn schema_builder_collects_attributes() {
        let schema = SchemaBuilder::new()
            .description("A team")
            .attribute("id", AttributeBuilder::string("id").computed())
            .attribute(
                "display_name",
                AttributeBuilder::string("display_name").required(),
            )
            .build_resource(0);

        assert_eq!(schema.version, 0);
        assert_eq!(schema.description, "A team");
        assert!(schema.attributes["display_name"].required);
        assert!(schema.attributes["id"].computed);
    }
}
