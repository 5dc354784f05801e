//! In-memory session lifecycle.
//!
//! The session moves through three phases: Loading while the persisted
//! credential is being read, then Authenticated or Unauthenticated for
//! the rest of the process lifetime. Consumers observe the phase
//! through a watch channel and always see the latest committed value.
//! A credential is only ever exposed as a complete user+token pair.

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::store::{CredentialStore, KEY_TOKEN, KEY_USER};
use crate::models::User;

/// A complete, confirmed credential pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthData {
    pub user: User,
    pub token: String,
}

/// Current authentication phase of the running app.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionPhase {
    /// Persisted credential not read yet. The UI shows a neutral
    /// waiting indicator and the navigation gate stays put.
    #[default]
    Loading,
    Authenticated(AuthData),
    Unauthenticated,
}

impl SessionPhase {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionPhase::Authenticated(data) => Some(&data.user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionPhase::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionPhase::Authenticated(_))
    }
}

/// Why a login or register attempt failed. Internal only: the public
/// boundary collapses this to a boolean, so callers cannot currently
/// tell a rejected password from a dead network.
#[derive(Debug)]
enum AuthFailure {
    Rejected,
    Transport,
    MalformedResponse,
    Storage,
}

impl From<ApiError> for AuthFailure {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized | ApiError::AccessDenied(_) => AuthFailure::Rejected,
            ApiError::InvalidResponse(_) => AuthFailure::MalformedResponse,
            _ => AuthFailure::Transport,
        }
    }
}

/// Owns the session phase and the operations that move it.
///
/// One manager exists per running app; it is injected into consumers
/// (shared behind an Arc) rather than reached through a global.
pub struct SessionManager {
    store: CredentialStore,
    api: ApiClient,
    phase: watch::Sender<SessionPhase>,
}

impl SessionManager {
    /// Create a manager in the Loading phase. `hydrate` resolves it.
    pub fn new(store: CredentialStore, api: ApiClient) -> Self {
        let (phase, _) = watch::channel(SessionPhase::Loading);
        Self { store, api, phase }
    }

    /// Observation point for the navigation gate and any other consumer.
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    /// Snapshot of the latest committed phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase.borrow().is_authenticated()
    }

    /// Resolve the Loading phase from the credential store. Runs once at
    /// startup.
    ///
    /// Only a complete pair with a parseable user record authenticates.
    /// A partial pair is treated as no session and the stray entry is
    /// cleared so it cannot shadow a later write. Storage and parse
    /// errors degrade to Unauthenticated; they are logged, never raised.
    pub async fn hydrate(&self) {
        let token = self.read_entry(KEY_TOKEN).await;
        let user_raw = self.read_entry(KEY_USER).await;

        let restored = match (token, user_raw) {
            (Some(token), Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(AuthData { user, token }),
                Err(e) => {
                    warn!(error = %e, "stored user record is malformed, discarding session");
                    self.clear_entries().await;
                    None
                }
            },
            (None, None) => None,
            _ => {
                warn!("partial credential pair in store, discarding session");
                self.clear_entries().await;
                None
            }
        };

        match restored {
            Some(data) => {
                debug!(user = %data.user.email, "session restored from store");
                self.api.set_token(data.token.clone());
                self.phase.send_replace(SessionPhase::Authenticated(data));
            }
            None => {
                self.phase.send_replace(SessionPhase::Unauthenticated);
            }
        }
    }

    /// Attempt a login. Never raises: every failure collapses to
    /// `false` and the session is left exactly as it was.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let outcome = self.api.login(email, password).await;
        match self.commit_authentication(outcome).await {
            Ok(()) => {
                info!("login succeeded");
                true
            }
            Err(reason) => {
                warn!(?reason, "login failed");
                false
            }
        }
    }

    /// Attempt a registration. Same contract as `login`.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> bool {
        let outcome = self.api.register(name, email, password).await;
        match self.commit_authentication(outcome).await {
            Ok(()) => {
                info!("registration succeeded");
                true
            }
            Err(reason) => {
                warn!(?reason, "registration failed");
                false
            }
        }
    }

    async fn commit_authentication(
        &self,
        outcome: Result<AuthData, ApiError>,
    ) -> std::result::Result<(), AuthFailure> {
        let data = outcome.map_err(AuthFailure::from)?;
        self.set_auth_data(data.user, data.token).await.map_err(|e| {
            warn!(error = %e, "confirmed credential could not be persisted");
            AuthFailure::Storage
        })
    }

    /// Persist a confirmed credential pair, then commit it to memory.
    ///
    /// Storage failure propagates to the caller here, and the in-memory
    /// phase is only committed once both entries are written.
    pub async fn set_auth_data(&self, user: User, token: String) -> Result<()> {
        let serialized =
            serde_json::to_string(&user).context("Failed to serialize user record")?;
        self.store.set(KEY_TOKEN, &token).await?;
        self.store.set(KEY_USER, &serialized).await?;

        self.api.set_token(token.clone());
        self.phase
            .send_replace(SessionPhase::Authenticated(AuthData { user, token }));
        Ok(())
    }

    /// Drop the session. Store removal is best-effort; memory is always
    /// reset to Unauthenticated.
    pub async fn logout(&self) {
        if let Err(e) = self.store.remove_many(&[KEY_TOKEN, KEY_USER]).await {
            warn!(error = %e, "failed to remove stored credential entries on logout");
        }
        self.api.clear_token();
        self.phase.send_replace(SessionPhase::Unauthenticated);
        info!("logged out");
    }

    /// Forced local logout after the server rejected the credential.
    ///
    /// The API client has already erased the stored pair by the time a
    /// 401 surfaces; this tears down the in-memory side and re-runs the
    /// removal in case a concurrent write re-created an entry.
    pub async fn invalidate(&self) {
        if !self.phase.borrow().is_authenticated() {
            return;
        }
        warn!("session invalidated by server rejection");
        self.clear_entries().await;
        self.api.clear_token();
        self.phase.send_replace(SessionPhase::Unauthenticated);
    }

    async fn read_entry(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "failed to read credential entry");
                None
            }
        }
    }

    async fn clear_entries(&self) {
        if let Err(e) = self.store.remove_many(&[KEY_TOKEN, KEY_USER]).await {
            warn!(error = %e, "failed to clear credential entries");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_store() -> (TempDir, CredentialStore) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = CredentialStore::new(dir.path().join("credentials"));
        (dir, store)
    }

    /// A manager whose API client points at a dead endpoint. Fine for
    /// tests that never leave the store.
    fn offline_manager(store: CredentialStore) -> SessionManager {
        let api = ApiClient::with_endpoints(store.clone(), "http://127.0.0.1:9", "http://127.0.0.1:9")
            .expect("Failed to build client");
        SessionManager::new(store, api)
    }

    fn sample_user() -> User {
        User {
            id: 7,
            email: "a@b.com".to_string(),
            name: "Ada".to_string(),
        }
    }

    #[tokio::test]
    async fn test_hydrate_restores_complete_pair() {
        let (_dir, store) = test_store();
        let user = sample_user();
        store.set(KEY_TOKEN, "tok-1").await.expect("set failed");
        store
            .set(KEY_USER, &serde_json::to_string(&user).expect("serialize"))
            .await
            .expect("set failed");

        let manager = offline_manager(store);
        manager.hydrate().await;

        match manager.phase() {
            SessionPhase::Authenticated(data) => {
                assert_eq!(data.user, user);
                assert_eq!(data.token, "tok-1");
            }
            other => panic!("expected authenticated session, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_hydrate_empty_store_is_unauthenticated() {
        let (_dir, store) = test_store();
        let manager = offline_manager(store);
        manager.hydrate().await;
        assert_eq!(manager.phase(), SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_hydrate_discards_partial_pair() {
        let (_dir, store) = test_store();
        store.set(KEY_TOKEN, "tok-1").await.expect("set failed");

        let manager = offline_manager(store.clone());
        manager.hydrate().await;

        assert_eq!(manager.phase(), SessionPhase::Unauthenticated);
        // The stray entry must be gone afterwards.
        assert_eq!(store.get(KEY_TOKEN).await.expect("get failed"), None);
        assert_eq!(store.get(KEY_USER).await.expect("get failed"), None);
    }

    #[tokio::test]
    async fn test_hydrate_swallows_malformed_user_record() {
        let (_dir, store) = test_store();
        store.set(KEY_TOKEN, "tok-1").await.expect("set failed");
        store.set(KEY_USER, "not json at all").await.expect("set failed");

        let manager = offline_manager(store.clone());
        manager.hydrate().await;

        assert_eq!(manager.phase(), SessionPhase::Unauthenticated);
        assert_eq!(store.get(KEY_TOKEN).await.expect("get failed"), None);
        assert_eq!(store.get(KEY_USER).await.expect("get failed"), None);
    }

    #[tokio::test]
    async fn test_login_fetches_profile_and_persists_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"authToken": "t"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": 1, "email": "a@b.com"})),
            )
            .mount(&server)
            .await;

        let (_dir, store) = test_store();
        let api = ApiClient::with_endpoints(store.clone(), &server.uri(), &server.uri())
            .expect("Failed to build client");
        let manager = SessionManager::new(store.clone(), api);

        assert!(manager.login("a@b.com", "pw").await);

        let phase = manager.phase();
        let user = phase.user().expect("expected authenticated session");
        assert_eq!(user.id, 1);
        assert_eq!(user.email, "a@b.com");
        // Remote record has no name: falls back to the email address.
        assert_eq!(user.name, "a@b.com");

        assert_eq!(
            store.get(KEY_TOKEN).await.expect("get failed").as_deref(),
            Some("t")
        );
        let stored: User = serde_json::from_str(
            &store
                .get(KEY_USER)
                .await
                .expect("get failed")
                .expect("user entry present"),
        )
        .expect("stored user parses");
        assert_eq!(&stored, user);
    }

    #[tokio::test]
    async fn test_register_uses_supplied_name_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/signup"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"authToken": "t2"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": 2, "email": "new@b.com"})),
            )
            .mount(&server)
            .await;

        let (_dir, store) = test_store();
        let api = ApiClient::with_endpoints(store.clone(), &server.uri(), &server.uri())
            .expect("Failed to build client");
        let manager = SessionManager::new(store, api);

        assert!(manager.register("Grace", "new@b.com", "pw").await);
        let phase = manager.phase();
        assert_eq!(phase.user().expect("authenticated").name, "Grace");
    }

    #[tokio::test]
    async fn test_login_without_token_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;
        // The profile fetch must never happen without a token.
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (_dir, store) = test_store();
        let api = ApiClient::with_endpoints(store.clone(), &server.uri(), &server.uri())
            .expect("Failed to build client");
        let manager = SessionManager::new(store.clone(), api);
        manager.hydrate().await;

        assert!(!manager.login("a@b.com", "pw").await);
        assert_eq!(manager.phase(), SessionPhase::Unauthenticated);
        assert_eq!(store.get(KEY_TOKEN).await.expect("get failed"), None);
    }

    #[tokio::test]
    async fn test_login_failure_leaves_prior_session_intact() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let (_dir, store) = test_store();
        let api = ApiClient::with_endpoints(store.clone(), &server.uri(), &server.uri())
            .expect("Failed to build client");
        let manager = SessionManager::new(store, api);
        let user = sample_user();
        manager
            .set_auth_data(user.clone(), "existing".to_string())
            .await
            .expect("set_auth_data failed");

        assert!(!manager.login("a@b.com", "wrong").await);
        match manager.phase() {
            SessionPhase::Authenticated(data) => {
                assert_eq!(data.user, user);
                assert_eq!(data.token, "existing");
            }
            other => panic!("expected prior session to survive, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejected_call_clears_stored_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todo"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let (_dir, store) = test_store();
        let api = ApiClient::with_endpoints(store.clone(), &server.uri(), &server.uri())
            .expect("Failed to build client");
        let manager = SessionManager::new(store.clone(), api.clone());
        manager
            .set_auth_data(sample_user(), "stale".to_string())
            .await
            .expect("set_auth_data failed");
        assert!(manager.is_authenticated());

        let err = api.fetch_todos().await.expect_err("expected a 401");
        assert!(err.is_unauthorized());

        // The client wiped the stored pair before surfacing the error.
        assert_eq!(store.get(KEY_TOKEN).await.expect("get failed"), None);
        assert_eq!(store.get(KEY_USER).await.expect("get failed"), None);

        manager.invalidate().await;
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_only_from_set_auth_data() {
        // A store rooted under a plain file: every write and removal
        // fails, reads degrade to absent.
        let dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").expect("write blocker");
        let store = CredentialStore::new(blocker.join("credentials"));

        let manager = offline_manager(store);

        let result = manager
            .set_auth_data(sample_user(), "tok".to_string())
            .await;
        assert!(result.is_err());
        // Memory is untouched when persistence fails before the commit.
        assert_eq!(manager.phase(), SessionPhase::Loading);

        // Logout never fails visibly, even over the same broken store.
        manager.logout().await;
        assert_eq!(manager.phase(), SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_subscribers_observe_commits() {
        let (_dir, store) = test_store();
        let manager = offline_manager(store);
        let mut rx = manager.subscribe();

        assert!(rx.borrow().is_loading());
        manager.hydrate().await;
        assert!(rx.has_changed().expect("channel alive"));
        assert_eq!(*rx.borrow_and_update(), SessionPhase::Unauthenticated);
    }
}
