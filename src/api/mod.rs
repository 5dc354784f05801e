//! REST API client module for the hosted todo service.
//!
//! This module provides the `ApiClient` for the two service endpoints:
//! the authentication API (login, signup, profile) and the todo
//! resource API. Requests carry a bearer token obtained at login.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
