//! Common types and utilities for the AllQuiet public API

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A REST collection of the public API. The request type is sent on create
/// and update, the implementing type is what the API answers with.
pub trait ApiResource: DeserializeOwned + Send + Sync + 'static {
    type Request: Serialize + Send + Sync;

    fn api_path() -> &'static str;

    fn resource_path(id: &str) -> String {
        format!("{}/{}", Self::api_path(), urlencoding::encode(id))
    }

    fn id(&self) -> &str;
}

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}
