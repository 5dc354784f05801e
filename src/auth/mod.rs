//! Session state and durable credential storage.
//!
//! This module provides:
//! - `SessionManager`: the in-memory session lifecycle (hydrate, login,
//!   register, logout), published through a watch channel
//! - `CredentialStore`: file-backed key-value persistence for the
//!   bearer token and user record across restarts

pub mod session;
pub mod store;

pub use session::{AuthData, SessionManager, SessionPhase};
pub use store::CredentialStore;
