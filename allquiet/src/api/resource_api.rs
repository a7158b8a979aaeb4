use std::marker::PhantomData;

use super::client::Client;
use super::common::{ApiQueryParams, ApiResource};
use super::error::ApiError;

/// CRUD operations on one REST collection such as `/team`
pub struct ResourceApi<'a, R> {
    client: &'a Client,
    _resource: PhantomData<R>,
}

impl<'a, R: ApiResource> ResourceApi<'a, R> {
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    /// POST /{collection}
    pub async fn create(&self, request: &R::Request) -> Result<R, ApiError> {
        self.client.post(R::api_path(), request).await
    }

    /// GET /{collection}/{id}, `None` when the object does not exist
    pub async fn get(&self, id: &str) -> Result<Option<R>, ApiError> {
        match self.client.get(&R::resource_path(id)).await {
            Ok(resource) => Ok(Some(resource)),
            Err(ApiError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// PUT /{collection}/{id}
    pub async fn update(&self, id: &str, request: &R::Request) -> Result<R, ApiError> {
        self.client.put(&R::resource_path(id), request).await
    }

    /// DELETE /{collection}/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .delete::<serde_json::Value>(&R::resource_path(id))
            .await
            .map(|_| ())
    }

    /// GET /{collection}?{params}
    pub async fn find(&self, params: &ApiQueryParams) -> Result<Vec<R>, ApiError> {
        let found: Option<Vec<R>> = self.client.get_with_params(R::api_path(), params).await?;
        Ok(found.unwrap_or_default())
    }
}
