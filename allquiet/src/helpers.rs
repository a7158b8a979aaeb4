//! Conversions between Terraform values and the optional fields of the API
//! wire types.
//!
//! Getters treat null and unknown alike and return `None`, so they can be fed
//! straight into `skip_serializing_if = "Option::is_none"` request fields.
//! The builders go the other way and turn `None` into an explicit null.

use std::collections::HashMap;
use tfplug::Dynamic;

pub type Values = HashMap<String, Dynamic>;

pub fn opt_string(values: &Values, name: &str) -> Option<String> {
    values.get(name).and_then(Dynamic::as_string).cloned()
}

/// Like [`opt_string`] but for attributes the schema marks as required
pub fn string(values: &Values, name: &str) -> String {
    opt_string(values, name).unwrap_or_default()
}

pub fn opt_bool(values: &Values, name: &str) -> Option<bool> {
    values.get(name).and_then(Dynamic::as_bool)
}

pub fn opt_number(values: &Values, name: &str) -> Option<f64> {
    values.get(name).and_then(Dynamic::as_number)
}

/// Whole numbers only. Attributes read through this carry a
/// `WholeNumberValidator`, so fractions never reach it from a valid plan.
pub fn opt_i64(values: &Values, name: &str) -> Option<i64> {
    opt_number(values, name)
        .filter(|n| n.fract() == 0.0)
        .map(|n| n as i64)
}

/// A list of strings; `None` for null/unknown, `Some(vec![])` for an empty list
pub fn string_list(values: &Values, name: &str) -> Option<Vec<String>> {
    values.get(name).and_then(Dynamic::as_list).map(|items| {
        items
            .iter()
            .filter_map(Dynamic::as_string)
            .cloned()
            .collect()
    })
}

pub fn opt_object<'a>(values: &'a Values, name: &str) -> Option<&'a Values> {
    values.get(name).and_then(Dynamic::as_map)
}

/// The objects of a nested list, in configuration order
pub fn object_list<'a>(values: &'a Values, name: &str) -> Option<Vec<&'a Values>> {
    values
        .get(name)
        .and_then(Dynamic::as_list)
        .map(|items| items.iter().filter_map(Dynamic::as_map).collect())
}

/// Maps every object of a nested list; `None` when the list is null
pub fn map_object_list<T>(
    values: &Values,
    name: &str,
    map: impl Fn(&Values) -> T,
) -> Option<Vec<T>> {
    object_list(values, name).map(|objects| objects.into_iter().map(map).collect())
}

pub fn null_if_none<T: Into<Dynamic>>(value: Option<T>) -> Dynamic {
    value.map_or(Dynamic::Null, Into::into)
}

pub fn to_string_list(items: Option<&Vec<String>>) -> Dynamic {
    match items {
        Some(items) => Dynamic::List(items.iter().cloned().map(Dynamic::String).collect()),
        None => Dynamic::Null,
    }
}

pub fn to_object_list<T>(items: Option<&Vec<T>>, map: impl Fn(&T) -> Dynamic) -> Dynamic {
    match items {
        Some(items) => Dynamic::List(items.iter().map(map).collect()),
        None => Dynamic::Null,
    }
}

pub fn to_object<T>(item: Option<&T>, map: impl Fn(&T) -> Dynamic) -> Dynamic {
    item.map_or(Dynamic::Null, map)
}

/// Builds an object value from attribute name/value pairs
pub fn object<const N: usize>(fields: [(&str, Dynamic); N]) -> Dynamic {
    Dynamic::Map(
        fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> Values {
        let mut values = Values::new();
        values.insert("name".to_string(), Dynamic::String("ops".to_string()));
        values.insert("unknown".to_string(), Dynamic::Unknown);
        values.insert("minutes".to_string(), Dynamic::Number(15.0));
        values.insert("ratio".to_string(), Dynamic::Number(0.5));
        values.insert("labels".to_string(), Dynamic::List(vec![]));
        values.insert(
            "tiers".to_string(),
            Dynamic::List(vec![object([("repeats", Dynamic::Number(2.0))])]),
        );
        values
    }

    #[test]
    fn getters_return_none_for_null_and_unknown() {
        let values = values();
        assert_eq!(opt_string(&values, "name"), Some("ops".to_string()));
        assert_eq!(opt_string(&values, "unknown"), None);
        assert_eq!(opt_string(&values, "missing"), None);
        assert_eq!(string(&values, "missing"), "");
    }

    #[test]
    fn integers_must_be_whole() {
        let values = values();
        assert_eq!(opt_i64(&values, "minutes"), Some(15));
        assert_eq!(opt_i64(&values, "ratio"), None);
    }

    #[test]
    fn empty_list_is_distinct_from_null() {
        let values = values();
        assert_eq!(string_list(&values, "labels"), Some(vec![]));
        assert_eq!(string_list(&values, "missing"), None);

        assert_eq!(to_string_list(Some(&vec![])), Dynamic::List(vec![]));
        assert_eq!(to_string_list(None), Dynamic::Null);
    }

    #[test]
    fn nested_lists_map_in_order() {
        let values = values();
        let repeats = map_object_list(&values, "tiers", |tier| opt_i64(tier, "repeats"));
        assert_eq!(repeats, Some(vec![Some(2)]));
        assert_eq!(map_object_list(&values, "missing", |_| ()), None);
    }

    #[test]
    fn null_if_none_keeps_values() {
        assert_eq!(null_if_none(None::<String>), Dynamic::Null);
        assert_eq!(null_if_none(Some(true)), Dynamic::Bool(true));
        assert_eq!(to_object(None::<&i64>, |n| Dynamic::from(*n)), Dynamic::Null);
    }
}
