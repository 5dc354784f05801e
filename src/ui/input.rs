//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{
    App, AppState, AuthFocus, Screen, TodoFocus, MAX_DESCRIPTION_LENGTH, MAX_EMAIL_LENGTH,
    MAX_NAME_LENGTH, MAX_PASSWORD_LENGTH, MAX_TITLE_LENGTH,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle the add-todo overlay
    if matches!(app.state, AppState::AddingTodo) {
        handle_add_todo_input(app, key);
        return Ok(false);
    }

    // Handle filter input
    if matches!(app.state, AppState::Searching) {
        handle_search_input(app, key);
        return Ok(false);
    }

    match app.screen {
        Screen::Login => handle_login_input(app, key).await,
        Screen::Register => handle_register_input(app, key).await,
        Screen::Home => handle_home_input(app, key).await,
    }
}

// ============================================================================
// Auth Screens
// ============================================================================

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
        app.switch_to_register();
        return Ok(false);
    }

    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            app.auth_focus = next_login_focus(app.auth_focus);
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.auth_focus = prev_login_focus(app.auth_focus);
        }
        KeyCode::Enter => {
            // Enter submits from the password field or the button,
            // otherwise it advances like Tab.
            if matches!(app.auth_focus, AuthFocus::Password | AuthFocus::Button) {
                app.submit_login().await;
            } else {
                app.auth_focus = next_login_focus(app.auth_focus);
            }
        }
        KeyCode::Backspace => {
            if let Some(field) = auth_field_mut(app) {
                field.pop();
            }
        }
        KeyCode::Char(c) => push_auth_char(app, c),
        _ => {}
    }
    Ok(false)
}

async fn handle_register_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
        app.switch_to_login();
        return Ok(false);
    }

    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            app.auth_focus = next_register_focus(app.auth_focus);
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.auth_focus = prev_register_focus(app.auth_focus);
        }
        KeyCode::Enter => {
            if matches!(app.auth_focus, AuthFocus::Password | AuthFocus::Button) {
                app.submit_register().await;
            } else {
                app.auth_focus = next_register_focus(app.auth_focus);
            }
        }
        KeyCode::Backspace => {
            if let Some(field) = auth_field_mut(app) {
                field.pop();
            }
        }
        KeyCode::Char(c) => push_auth_char(app, c),
        _ => {}
    }
    Ok(false)
}

fn next_login_focus(focus: AuthFocus) -> AuthFocus {
    match focus {
        AuthFocus::Email => AuthFocus::Password,
        AuthFocus::Password => AuthFocus::Button,
        // Name is not part of the login form
        AuthFocus::Button | AuthFocus::Name => AuthFocus::Email,
    }
}

fn prev_login_focus(focus: AuthFocus) -> AuthFocus {
    match focus {
        AuthFocus::Email => AuthFocus::Button,
        AuthFocus::Password => AuthFocus::Email,
        AuthFocus::Button | AuthFocus::Name => AuthFocus::Password,
    }
}

fn next_register_focus(focus: AuthFocus) -> AuthFocus {
    match focus {
        AuthFocus::Name => AuthFocus::Email,
        AuthFocus::Email => AuthFocus::Password,
        AuthFocus::Password => AuthFocus::Button,
        AuthFocus::Button => AuthFocus::Name,
    }
}

fn prev_register_focus(focus: AuthFocus) -> AuthFocus {
    match focus {
        AuthFocus::Name => AuthFocus::Button,
        AuthFocus::Email => AuthFocus::Name,
        AuthFocus::Password => AuthFocus::Email,
        AuthFocus::Button => AuthFocus::Password,
    }
}

/// The string behind the focused form field, if the focus is a field.
fn auth_field_mut(app: &mut App) -> Option<&mut String> {
    match app.auth_focus {
        AuthFocus::Name => Some(&mut app.form_name),
        AuthFocus::Email => Some(&mut app.form_email),
        AuthFocus::Password => Some(&mut app.form_password),
        AuthFocus::Button => None,
    }
}

fn push_auth_char(app: &mut App, c: char) {
    let max = match app.auth_focus {
        AuthFocus::Name => MAX_NAME_LENGTH,
        AuthFocus::Email => MAX_EMAIL_LENGTH,
        AuthFocus::Password => MAX_PASSWORD_LENGTH,
        AuthFocus::Button => return,
    };
    if let Some(field) = auth_field_mut(app) {
        if field.chars().count() < max {
            field.push(c);
        }
    }
}

// ============================================================================
// Home Screen
// ============================================================================

async fn handle_home_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('a') => {
            app.status_message = None;
            app.state = AppState::AddingTodo;
        }
        KeyCode::Char('r') => {
            app.refresh_todos();
        }
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
        }
        KeyCode::Char('L') => {
            app.logout().await;
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            app.toggle_selected();
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            app.delete_selected();
        }
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Esc => {
            app.search_query.clear();
            app.move_selection(0);
        }
        _ => {}
    }
    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.search_query.clear();
            app.state = AppState::Normal;
            app.move_selection(0);
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            app.move_selection(0);
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            app.move_selection(0);
        }
        _ => {}
    }
}

fn handle_add_todo_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.new_title.clear();
            app.new_description.clear();
            app.todo_focus = TodoFocus::Title;
            app.state = AppState::Normal;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.todo_focus = match app.todo_focus {
                TodoFocus::Title => TodoFocus::Description,
                TodoFocus::Description => TodoFocus::Title,
            };
        }
        KeyCode::Enter => {
            app.submit_new_todo();
        }
        KeyCode::Backspace => {
            match app.todo_focus {
                TodoFocus::Title => app.new_title.pop(),
                TodoFocus::Description => app.new_description.pop(),
            };
        }
        KeyCode::Char(c) => match app.todo_focus {
            TodoFocus::Title => {
                if app.new_title.chars().count() < MAX_TITLE_LENGTH {
                    app.new_title.push(c);
                }
            }
            TodoFocus::Description => {
                if app.new_description.chars().count() < MAX_DESCRIPTION_LENGTH {
                    app.new_description.push(c);
                }
            }
        },
        _ => {}
    }
}
