//! Navigation guard.

use sagip_session::Session;
use serde::Serialize;
use tracing::debug;

use crate::route::RouteMeta;

/// Login page.
pub const LOGIN_PATH: &str = "/auth/login";

/// Outcome of guarding a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "to", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Let the navigation through.
    Proceed,
    /// Not signed in; go to the login page.
    RedirectToLogin,
    /// Signed in and heading for an auth page; go to the role's dashboard.
    RedirectToRoleHome(&'static str),
    /// Role not allowed on the target; go to the role's fallback page.
    RedirectToRoleFallback(&'static str),
}

impl GuardDecision {
    /// Where the guard sends the user, if anywhere.
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            GuardDecision::Proceed => None,
            GuardDecision::RedirectToLogin => Some(LOGIN_PATH),
            GuardDecision::RedirectToRoleHome(path) => Some(path),
            GuardDecision::RedirectToRoleFallback(path) => Some(path),
        }
    }

    /// Check if the navigation goes through.
    pub fn is_proceed(&self) -> bool {
        matches!(self, GuardDecision::Proceed)
    }
}

/// Check if a path is a login/registration page.
pub fn is_auth_route(path: &str) -> bool {
    path.starts_with("/auth/")
}

/// Decide what happens when navigating to `path`.
///
/// Rules are checked in order and the first match wins:
///
/// 1. target requires auth and the session is signed out: login
/// 2. signed in and the target is an auth page: role home, unless already there
/// 3. signed in, target requires auth and excludes the role: role fallback,
///    unless already there
/// 4. proceed
///
/// No I/O happens here; a token revoked on the server is only noticed on
/// the next API call.
pub fn decide(path: &str, meta: &RouteMeta, session: &Session) -> GuardDecision {
    let decision = evaluate(path, meta, session);
    if !decision.is_proceed() {
        debug!(path, ?decision, role = %session.role(), "navigation redirected");
    }
    decision
}

fn evaluate(path: &str, meta: &RouteMeta, session: &Session) -> GuardDecision {
    if meta.requires_auth && !session.is_authenticated {
        return GuardDecision::RedirectToLogin;
    }

    let role = session.role();

    if session.is_authenticated && is_auth_route(path) {
        let home = role.home_path();
        // Loop guard: never redirect a page to itself. Built-in homes sit
        // outside `/auth/`, so this only matters if one moves there.
        if path == home {
            return GuardDecision::Proceed;
        }
        return GuardDecision::RedirectToRoleHome(home);
    }

    if meta.requires_auth && session.is_authenticated && !meta.allows(role) {
        let fallback = role.fallback_path();
        if path == fallback {
            return GuardDecision::Proceed;
        }
        return GuardDecision::RedirectToRoleFallback(fallback);
    }

    GuardDecision::Proceed
}
