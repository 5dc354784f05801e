//! API client for the hosted todo service.
//!
//! Two base endpoints are used: one scoped to authentication, one to
//! todo resources. The bearer token is read from a shared slot at
//! request-send time, so a token set after login is picked up by the
//! next call without rebuilding the client. Any 401 response from
//! either endpoint erases the stored credential pair before the error
//! surfaces, so a known-bad token is never retried.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::store::{CredentialStore, KEY_TOKEN, KEY_USER};
use crate::auth::AuthData;
use crate::models::{NewTodo, Todo, TodoPatch, User};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for authentication endpoints
const AUTH_BASE_URL: &str = "https://x8ki-letl-twmt.n7.xano.io/api:0EHxHUr7";

/// Base URL for todo resource endpoints
const TODO_BASE_URL: &str = "https://x8ki-letl-twmt.n7.xano.io/api:kZemCDCA";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "authToken")]
    auth_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    id: i64,
    email: String,
    #[serde(default)]
    name: Option<String>,
}

/// API client for the todo service.
/// Clone is cheap - reqwest::Client pools connections behind an Arc, and
/// the token slot is shared so every clone sees the current credential.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    auth_base: String,
    todo_base: String,
    token: Arc<RwLock<Option<String>>>,
    store: CredentialStore,
}

impl ApiClient {
    /// Create a client against the production endpoints.
    pub fn new(store: CredentialStore) -> Result<Self, ApiError> {
        Self::with_endpoints(store, AUTH_BASE_URL, TODO_BASE_URL)
    }

    /// Create a client against explicit base endpoints.
    pub fn with_endpoints(
        store: CredentialStore,
        auth_base: &str,
        todo_base: &str,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            auth_base: auth_base.trim_end_matches('/').to_string(),
            todo_base: todo_base.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
            store,
        })
    }

    /// Set the bearer token used for subsequent requests.
    pub fn set_token(&self, token: String) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
    }

    /// Drop the bearer token; subsequent requests go out unauthenticated.
    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn current_token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Build a request, attaching the current bearer token. The token is
    /// read here, at send time, not when the client was constructed.
    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let mut req = self.client.request(method, url);
        if let Some(token) = self.current_token() {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Check a response, converting non-success statuses into ApiError.
    /// A 401 means the credential is no longer valid anywhere: the
    /// stored pair is erased and the token slot cleared before the
    /// error is surfaced.
    async fn check_response(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            self.discard_rejected_credential().await;
        }
        Err(ApiError::from_status(status, &body))
    }

    async fn discard_rejected_credential(&self) {
        warn!("credential rejected by the server, clearing stored session");
        self.clear_token();
        if let Err(e) = self.store.remove_many(&[KEY_TOKEN, KEY_USER]).await {
            warn!(error = %e, "failed to clear stored credential entries");
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        let response = self.request(Method::GET, url).send().await?;
        let response = self.check_response(response).await?;
        Self::parse_json(response).await
    }

    // ===== Auth Endpoints =====

    /// Log in and return the confirmed credential pair.
    ///
    /// Two round-trips: the login call yields only a bearer token (its
    /// absence is a hard failure, not a retry), then the canonical
    /// profile comes from a follow-up `/auth/me` fetch with that token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthData, ApiError> {
        let url = format!("{}/auth/login", self.auth_base);
        let body = serde_json::json!({ "email": email, "password": password });

        let response = self.request(Method::POST, url).json(&body).send().await?;
        let response = self.check_response(response).await?;
        let token = Self::extract_token(response).await?;

        let user = self.fetch_profile_with(&token, None).await?;
        debug!(user = %user.email, "login confirmed");
        Ok(AuthData { user, token })
    }

    /// Register a new account and return the confirmed credential pair.
    /// Same shape as `login`, with the supplied name in the fallback
    /// chain for the profile's display name.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthData, ApiError> {
        let url = format!("{}/auth/signup", self.auth_base);
        let body = serde_json::json!({ "name": name, "email": email, "password": password });

        let response = self.request(Method::POST, url).json(&body).send().await?;
        let response = self.check_response(response).await?;
        let token = Self::extract_token(response).await?;

        let user = self.fetch_profile_with(&token, Some(name)).await?;
        debug!(user = %user.email, "registration confirmed");
        Ok(AuthData { user, token })
    }

    /// Fetch the profile for the current session token.
    pub async fn get_profile(&self) -> Result<User, ApiError> {
        let url = format!("{}/auth/me", self.auth_base);
        let response = self.request(Method::GET, url).send().await?;
        let response = self.check_response(response).await?;
        let profile: ProfileResponse = Self::parse_json(response).await?;
        Ok(profile.into_user(None))
    }

    async fn extract_token(response: Response) -> Result<String, ApiError> {
        let token: TokenResponse = Self::parse_json(response).await?;
        token.auth_token.ok_or_else(|| {
            ApiError::InvalidResponse("auth response carried no authToken".to_string())
        })
    }

    /// Fetch `/auth/me` with an explicit token (the slot is not updated
    /// until the session layer commits the pair).
    async fn fetch_profile_with(
        &self,
        token: &str,
        supplied_name: Option<&str>,
    ) -> Result<User, ApiError> {
        let url = format!("{}/auth/me", self.auth_base);
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let response = self.check_response(response).await?;
        let profile: ProfileResponse = Self::parse_json(response).await?;
        Ok(profile.into_user(supplied_name))
    }

    // ===== Todo Endpoints =====

    /// Fetch the full todo list.
    pub async fn fetch_todos(&self) -> Result<Vec<Todo>, ApiError> {
        self.get_json(format!("{}/todo", self.todo_base)).await
    }

    /// Create a todo and return the created record.
    pub async fn create_todo(&self, new: &NewTodo) -> Result<Todo, ApiError> {
        let url = format!("{}/todo", self.todo_base);
        let response = self.request(Method::POST, url).json(new).send().await?;
        let response = self.check_response(response).await?;
        Self::parse_json(response).await
    }

    /// Apply a partial update and return the updated record.
    pub async fn update_todo(&self, id: i64, patch: &TodoPatch) -> Result<Todo, ApiError> {
        let url = format!("{}/todo/{}", self.todo_base, id);
        let response = self.request(Method::PATCH, url).json(patch).send().await?;
        let response = self.check_response(response).await?;
        Self::parse_json(response).await
    }

    /// Delete a todo. The service's deletion result body is discarded.
    pub async fn delete_todo(&self, id: i64) -> Result<(), ApiError> {
        let url = format!("{}/todo/{}", self.todo_base, id);
        let response = self.request(Method::DELETE, url).send().await?;
        self.check_response(response).await?;
        Ok(())
    }
}

impl ProfileResponse {
    /// Build the session's User, resolving the display name through the
    /// fallback chain: remote name, then the name supplied at
    /// registration, then the email address.
    fn into_user(self, supplied_name: Option<&str>) -> User {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                supplied_name
                    .map(str::to_string)
                    .filter(|n| !n.trim().is_empty())
            })
            .unwrap_or_else(|| self.email.clone());
        User {
            id: self.id,
            email: self.email,
            name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: Option<&str>) -> ProfileResponse {
        ProfileResponse {
            id: 1,
            email: "a@b.com".to_string(),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_remote_name_wins() {
        let user = profile(Some("Ada")).into_user(Some("Supplied"));
        assert_eq!(user.name, "Ada");
    }

    #[test]
    fn test_supplied_name_used_when_remote_absent() {
        let user = profile(None).into_user(Some("Supplied"));
        assert_eq!(user.name, "Supplied");
    }

    #[test]
    fn test_email_is_last_resort() {
        let user = profile(None).into_user(None);
        assert_eq!(user.name, "a@b.com");
    }

    #[test]
    fn test_blank_names_are_skipped() {
        let user = profile(Some("  ")).into_user(Some(""));
        assert_eq!(user.name, "a@b.com");
    }
}
