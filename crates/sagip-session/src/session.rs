//! Session state.

use serde::{Deserialize, Serialize};

use crate::profile::UserProfile;
use crate::role::Role;

/// Store keys owned by the session.
///
/// These four keys are the whole persisted session; clearing the session
/// removes exactly these and nothing else.
pub mod keys {
    /// Bearer token for API requests.
    pub const ACCESS_TOKEN: &str = "access_token";
    /// Long-lived token used to obtain new access tokens.
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// `"true"` while signed in.
    pub const IS_AUTHENTICATED: &str = "isAuthenticated";
    /// JSON-encoded [`UserProfile`](crate::UserProfile).
    pub const USER_DATA: &str = "userData";

    /// All session keys.
    pub const ALL: [&str; 4] = [ACCESS_TOKEN, REFRESH_TOKEN, IS_AUTHENTICATED, USER_DATA];
}

/// Token pair returned by the login and refresh endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token.
    pub access: String,
    /// Refresh token. The refresh endpoint only returns one when rotation
    /// is enabled on the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl TokenPair {
    /// Create a token pair.
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: Some(refresh.into()),
        }
    }
}

/// Client-held record of authentication state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Whether the user is signed in.
    pub is_authenticated: bool,
    /// Current access token.
    pub access_token: Option<String>,
    /// Current refresh token.
    pub refresh_token: Option<String>,
    /// Cached profile.
    pub user_profile: Option<UserProfile>,
}

impl Session {
    /// A signed-out session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A signed-in session.
    pub fn authenticated(tokens: TokenPair) -> Self {
        Self {
            is_authenticated: true,
            access_token: Some(tokens.access),
            refresh_token: tokens.refresh,
            user_profile: None,
        }
    }

    /// Attach a profile.
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.user_profile = Some(profile);
        self
    }

    /// Shorthand for a signed-in session with the given role.
    pub fn with_role(role: Role) -> Self {
        Self {
            is_authenticated: true,
            access_token: None,
            refresh_token: None,
            user_profile: Some(UserProfile {
                role,
                ..Default::default()
            }),
        }
    }

    /// Role of the signed-in user; citizen when no profile is cached.
    pub fn role(&self) -> Role {
        self.user_profile
            .as_ref()
            .map(|p| p.role)
            .unwrap_or_default()
    }
}
