//! Screen-group gating on session state.
//!
//! The gate is a pure decision: given the latest session phase and the
//! screen group currently displayed, it yields at most one redirect.
//! Re-applying the decision after the redirect lands yields None, so
//! the caller can evaluate it on every tick without looping.

use crate::auth::SessionPhase;

/// The two navigation areas of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenGroup {
    /// Login and register screens.
    Auth,
    /// The authenticated tab area.
    Tabs,
}

/// A screen switch the app should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    ToLogin,
    ToHome,
}

/// Decide whether the displayed screen group matches the session phase.
///
/// While the session is still loading no redirect is issued, whatever
/// the current group. Otherwise an unauthenticated session belongs in
/// the auth group and an authenticated one outside it.
pub fn decide(phase: &SessionPhase, current: ScreenGroup) -> Option<Redirect> {
    match phase {
        SessionPhase::Loading => None,
        SessionPhase::Unauthenticated if current != ScreenGroup::Auth => Some(Redirect::ToLogin),
        SessionPhase::Authenticated(_) if current == ScreenGroup::Auth => Some(Redirect::ToHome),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthData;
    use crate::models::User;

    fn authenticated() -> SessionPhase {
        SessionPhase::Authenticated(AuthData {
            user: User {
                id: 1,
                email: "a@b.com".to_string(),
                name: "Ada".to_string(),
            },
            token: "t".to_string(),
        })
    }

    #[test]
    fn test_no_redirect_while_loading() {
        assert_eq!(decide(&SessionPhase::Loading, ScreenGroup::Auth), None);
        assert_eq!(decide(&SessionPhase::Loading, ScreenGroup::Tabs), None);
    }

    #[test]
    fn test_unauthenticated_outside_auth_group_goes_to_login() {
        assert_eq!(
            decide(&SessionPhase::Unauthenticated, ScreenGroup::Tabs),
            Some(Redirect::ToLogin)
        );
    }

    #[test]
    fn test_unauthenticated_in_auth_group_stays_put() {
        assert_eq!(decide(&SessionPhase::Unauthenticated, ScreenGroup::Auth), None);
    }

    #[test]
    fn test_authenticated_in_auth_group_goes_home() {
        assert_eq!(
            decide(&authenticated(), ScreenGroup::Auth),
            Some(Redirect::ToHome)
        );
    }

    #[test]
    fn test_redirect_happens_exactly_once() {
        let phase = authenticated();
        // Login succeeds while on a login screen: one redirect home.
        assert_eq!(decide(&phase, ScreenGroup::Auth), Some(Redirect::ToHome));
        // Once in the tab area, further state observations are no-ops.
        assert_eq!(decide(&phase, ScreenGroup::Tabs), None);
        assert_eq!(decide(&phase, ScreenGroup::Tabs), None);
    }
}
