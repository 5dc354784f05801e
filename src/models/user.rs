use serde::{Deserialize, Serialize};

/// The authenticated account. Immutable for the lifetime of a session;
/// replaced wholesale on re-login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
}
