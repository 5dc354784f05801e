//! Application state management for Tasklight.
//!
//! This module contains the core `App` struct that owns the session
//! manager, the current screen, form state, the todo list, and the
//! background task coordination.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::warn;

use crate::api::{ApiClient, ApiError};
use crate::auth::{CredentialStore, SessionManager, SessionPhase};
use crate::config::Config;
use crate::models::{NewTodo, Todo, TodoPatch};
use crate::ui::gate::{self, Redirect, ScreenGroup};
use crate::utils::contains_ignore_case;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// 32 is plenty for the handful of in-flight todo operations.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for the email input.
pub const MAX_EMAIL_LENGTH: usize = 64;

/// Maximum length for the password input.
/// 128 chars accommodates password managers and passphrases.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for the display name input.
pub const MAX_NAME_LENGTH: usize = 64;

/// Maximum length for a todo title.
pub const MAX_TITLE_LENGTH: usize = 120;

/// Maximum length for a todo description.
pub const MAX_DESCRIPTION_LENGTH: usize = 240;

// ============================================================================
// UI State Types
// ============================================================================

/// The screens of the app. Login and Register form the auth group;
/// Home is the authenticated tab area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Home,
}

impl Screen {
    pub fn group(self) -> ScreenGroup {
        match self {
            Screen::Login | Screen::Register => ScreenGroup::Auth,
            Screen::Home => ScreenGroup::Tabs,
        }
    }
}

/// Overall application state (overlays on top of the current screen)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    AddingTodo,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Auth form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFocus {
    Name,
    Email,
    Password,
    Button,
}

/// Add-todo form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoFocus {
    Title,
    Description,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from background todo operations back to the main loop.
pub enum RefreshResult {
    /// Full todo list fetched successfully
    Todos(Vec<Todo>),
    /// A todo was created
    Created(Todo),
    /// A todo was updated (completion toggle or edit)
    Updated(Todo),
    /// A todo was deleted
    Deleted(i64),
    /// The server rejected the credential; the session must be torn down
    Unauthorized,
    /// Any other failure, as a display message
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: Arc<SessionManager>,
    pub api: ApiClient,

    // Navigation
    pub state: AppState,
    pub screen: Screen,
    phase_rx: watch::Receiver<SessionPhase>,

    // Auth form state (shared by login and register)
    pub form_name: String,
    pub form_email: String,
    pub form_password: String,
    pub auth_focus: AuthFocus,
    pub auth_error: Option<String>,

    // Todo list state
    pub todos: Vec<Todo>,
    pub todo_selection: usize,
    pub search_query: String,
    pub refreshing: bool,

    // Add-todo form state
    pub new_title: String,
    pub new_description: String,
    pub todo_focus: TodoFocus,

    // Background task channel
    refresh_rx: mpsc::Receiver<RefreshResult>,
    refresh_tx: mpsc::Sender<RefreshResult>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance in the Loading phase.
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = Config::cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        let store = CredentialStore::new(cache_dir.join("credentials"));
        let api = ApiClient::new(store.clone())?;
        let session = Arc::new(SessionManager::new(store, api.clone()));
        let phase_rx = session.subscribe();

        let (refresh_tx, refresh_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let form_email = config.last_email.clone().unwrap_or_default();

        Ok(Self {
            config,
            session,
            api,

            state: AppState::Normal,
            screen: Screen::Login,
            phase_rx,

            form_name: String::new(),
            form_email,
            form_password: String::new(),
            auth_focus: AuthFocus::Email,
            auth_error: None,

            todos: Vec::new(),
            todo_selection: 0,
            search_query: String::new(),
            refreshing: false,

            new_title: String::new(),
            new_description: String::new(),
            todo_focus: TodoFocus::Title,

            refresh_rx,
            refresh_tx,

            status_message: None,
        })
    }

    // =========================================================================
    // Session & Navigation
    // =========================================================================

    /// Kick off the one-time hydration of the persisted session.
    pub fn start_hydration(&self) {
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            session.hydrate().await;
        });
    }

    /// Latest committed session phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase_rx.borrow().clone()
    }

    /// Reconcile the displayed screen with the session phase. Runs every
    /// tick of the event loop; the gate decision is idempotent, so a
    /// settled state produces no work.
    pub fn apply_gate(&mut self) {
        let phase = self.phase_rx.borrow().clone();
        match gate::decide(&phase, self.screen.group()) {
            Some(Redirect::ToLogin) => {
                self.screen = Screen::Login;
                self.reset_auth_form();
            }
            Some(Redirect::ToHome) => {
                self.screen = Screen::Home;
                self.form_password.clear();
                self.refresh_todos();
            }
            None => {}
        }
    }

    /// Submit the login form. Awaited inline: the form is modal and the
    /// next draw reflects the outcome; the gate performs the redirect.
    pub async fn submit_login(&mut self) {
        let email = self.form_email.trim().to_string();
        let password = self.form_password.clone();
        if email.is_empty() || password.is_empty() {
            self.auth_error = Some("Email and password required".to_string());
            return;
        }

        self.auth_error = None;
        if self.session.login(&email, &password).await {
            self.config.last_email = Some(email);
            if let Err(e) = self.config.save() {
                warn!(error = %e, "Failed to save config");
            }
        } else {
            self.auth_error =
                Some("Sign in failed - check your credentials and connection".to_string());
        }
    }

    /// Submit the register form. Same contract as `submit_login`.
    pub async fn submit_register(&mut self) {
        let name = self.form_name.trim().to_string();
        let email = self.form_email.trim().to_string();
        let password = self.form_password.clone();
        if email.is_empty() || password.is_empty() {
            self.auth_error = Some("Email and password required".to_string());
            return;
        }

        self.auth_error = None;
        if self.session.register(&name, &email, &password).await {
            self.config.last_email = Some(email);
            if let Err(e) = self.config.save() {
                warn!(error = %e, "Failed to save config");
            }
        } else {
            self.auth_error =
                Some("Registration failed - check your details and connection".to_string());
        }
    }

    /// Drop the session; the gate routes back to the login screen.
    pub async fn logout(&mut self) {
        self.session.logout().await;
        self.todos.clear();
        self.todo_selection = 0;
        self.search_query.clear();
        self.status_message = None;
    }

    pub fn switch_to_register(&mut self) {
        self.screen = Screen::Register;
        self.auth_focus = AuthFocus::Name;
        self.auth_error = None;
    }

    pub fn switch_to_login(&mut self) {
        self.screen = Screen::Login;
        self.reset_auth_form();
    }

    fn reset_auth_form(&mut self) {
        self.form_password.clear();
        self.auth_focus = if self.form_email.is_empty() {
            AuthFocus::Email
        } else {
            AuthFocus::Password
        };
        self.auth_error = None;
    }

    // =========================================================================
    // Todo Operations
    // =========================================================================

    /// Fetch the todo list in the background. The profile fetch rides
    /// along as a liveness check on the stored credential.
    pub fn refresh_todos(&mut self) {
        if self.refreshing {
            return;
        }
        self.refreshing = true;

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            let (todos, profile) = futures::join!(api.fetch_todos(), api.get_profile());
            match todos {
                Ok(list) => {
                    let _ = tx.send(RefreshResult::Todos(list)).await;
                }
                Err(e) => {
                    let _ = tx.send(Self::refresh_failure(e)).await;
                }
            }
            if let Err(e) = profile {
                if e.is_unauthorized() {
                    let _ = tx.send(RefreshResult::Unauthorized).await;
                }
            }
        });
    }

    /// Create a todo from the add form and close the overlay.
    pub fn submit_new_todo(&mut self) {
        let title = self.new_title.trim().to_string();
        if title.is_empty() {
            self.status_message = Some("A title is required".to_string());
            return;
        }
        let description = {
            let d = self.new_description.trim();
            (!d.is_empty()).then(|| d.to_string())
        };

        self.new_title.clear();
        self.new_description.clear();
        self.todo_focus = TodoFocus::Title;
        self.state = AppState::Normal;

        let new = NewTodo { title, description };
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            match api.create_todo(&new).await {
                Ok(todo) => {
                    let _ = tx.send(RefreshResult::Created(todo)).await;
                }
                Err(e) => {
                    let _ = tx.send(Self::refresh_failure(e)).await;
                }
            }
        });
    }

    /// Flip the completion flag of the selected todo.
    pub fn toggle_selected(&mut self) {
        let Some(todo) = self.selected_todo() else {
            return;
        };
        let id = todo.id;
        let patch = TodoPatch::completion(!todo.completed);

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            match api.update_todo(id, &patch).await {
                Ok(updated) => {
                    let _ = tx.send(RefreshResult::Updated(updated)).await;
                }
                Err(e) => {
                    let _ = tx.send(Self::refresh_failure(e)).await;
                }
            }
        });
    }

    /// Delete the selected todo.
    pub fn delete_selected(&mut self) {
        let Some(todo) = self.selected_todo() else {
            return;
        };
        let id = todo.id;

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            match api.delete_todo(id).await {
                Ok(()) => {
                    let _ = tx.send(RefreshResult::Deleted(id)).await;
                }
                Err(e) => {
                    let _ = tx.send(Self::refresh_failure(e)).await;
                }
            }
        });
    }

    fn refresh_failure(e: ApiError) -> RefreshResult {
        if e.is_unauthorized() {
            RefreshResult::Unauthorized
        } else {
            RefreshResult::Error(e.to_string())
        }
    }

    /// Drain completed background tasks into the app state.
    pub async fn check_background_tasks(&mut self) {
        while let Ok(result) = self.refresh_rx.try_recv() {
            match result {
                RefreshResult::Todos(list) => {
                    self.refreshing = false;
                    self.todos = list;
                    self.clamp_selection();
                }
                RefreshResult::Created(todo) => {
                    self.todos.push(todo);
                    self.status_message = Some("Todo created".to_string());
                }
                RefreshResult::Updated(updated) => {
                    if let Some(slot) = self.todos.iter_mut().find(|t| t.id == updated.id) {
                        *slot = updated;
                    }
                }
                RefreshResult::Deleted(id) => {
                    self.todos.retain(|t| t.id != id);
                    self.clamp_selection();
                    self.status_message = Some("Todo deleted".to_string());
                }
                RefreshResult::Unauthorized => {
                    self.refreshing = false;
                    self.status_message = Some("Session expired - please sign in again".to_string());
                    self.session.invalidate().await;
                }
                RefreshResult::Error(message) => {
                    self.refreshing = false;
                    warn!(error = %message, "background todo operation failed");
                    self.status_message = Some(message);
                }
            }
        }
    }

    // =========================================================================
    // Selection & Filtering
    // =========================================================================

    /// The todo list with the current search filter applied.
    pub fn filtered_todos(&self) -> Vec<&Todo> {
        if self.search_query.is_empty() {
            self.todos.iter().collect()
        } else {
            self.todos
                .iter()
                .filter(|t| {
                    contains_ignore_case(&t.title, &self.search_query)
                        || t.description
                            .as_deref()
                            .map(|d| contains_ignore_case(d, &self.search_query))
                            .unwrap_or(false)
                })
                .collect()
        }
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        self.filtered_todos().get(self.todo_selection).copied()
    }

    pub fn move_selection(&mut self, delta: i64) {
        let len = self.filtered_todos().len();
        if len == 0 {
            self.todo_selection = 0;
            return;
        }
        let current = self.todo_selection as i64;
        self.todo_selection = (current + delta).clamp(0, len as i64 - 1) as usize;
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered_todos().len();
        if len == 0 {
            self.todo_selection = 0;
        } else if self.todo_selection >= len {
            self.todo_selection = len - 1;
        }
    }

    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_groups() {
        assert_eq!(Screen::Login.group(), ScreenGroup::Auth);
        assert_eq!(Screen::Register.group(), ScreenGroup::Auth);
        assert_eq!(Screen::Home.group(), ScreenGroup::Tabs);
    }
}
