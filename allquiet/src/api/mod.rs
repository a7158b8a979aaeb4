//! Typed client for the AllQuiet public REST API

pub mod client;
pub mod common;
pub mod error;
pub mod resource_api;

pub mod integration;
pub mod maintenance_window;
pub mod outbound_integration;
pub mod routing;
pub mod service;
pub mod status_page;
pub mod team;
pub mod team_escalations;
pub mod team_membership;
pub mod user;

pub use client::{Client, RetryConfig, DEFAULT_ENDPOINT};
pub use common::{ApiQueryParams, ApiResource};
pub use error::ApiError;
pub use resource_api::ResourceApi;
