//! User roles.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// User role for route access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Member of the public.
    #[default]
    Citizen,
    /// Evacuation center staff or response team.
    Staff,
    /// Provincial or municipal administrator.
    Admin,
}

impl Role {
    /// All roles.
    pub const ALL: [Role; 3] = [Role::Citizen, Role::Staff, Role::Admin];

    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    /// Dashboard a signed-in user lands on.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::Staff => "/staff/dashboard",
            Role::Citizen => "/user/dashboard",
        }
    }

    /// Where a user is sent when a route rejects their role.
    ///
    /// Staff share the admin fallback.
    pub fn fallback_path(&self) -> &'static str {
        match self {
            Role::Admin | Role::Staff => "/admin/dashboard",
            Role::Citizen => "/user/dashboard",
        }
    }

    /// Parse a role, treating anything unrecognised as a citizen.
    pub fn parse_lenient(s: &str) -> Role {
        s.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is not recognised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Accepts the client names and the backend's role codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "citizen" | "user" | "CITIZEN" => Ok(Role::Citizen),
            "staff" | "EVAC_CENTER_STAFF" | "RESPONSE_TEAM" => Ok(Role::Staff),
            "admin" | "PROVINCIAL_ADMIN" | "MUNICIPAL_ADMIN" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Deserialize a role from any string, defaulting unknown values to citizen.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(Role::parse_lenient).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_default_is_citizen() {
        assert_eq!(Role::default(), Role::Citizen);
    }

    #[test]
    fn test_role_from_backend_codes() {
        assert_eq!("CITIZEN".parse::<Role>(), Ok(Role::Citizen));
        assert_eq!("PROVINCIAL_ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("MUNICIPAL_ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("EVAC_CENTER_STAFF".parse::<Role>(), Ok(Role::Staff));
        assert_eq!("RESPONSE_TEAM".parse::<Role>(), Ok(Role::Staff));
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn test_unknown_role_error() {
        let err = "janitor".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("janitor".to_string()));
        assert_eq!(err.to_string(), "unknown role: janitor");
    }

    #[test]
    fn test_role_lenient_parse() {
        assert_eq!(Role::parse_lenient("admin"), Role::Admin);
        assert_eq!(Role::parse_lenient("nonsense"), Role::Citizen);
    }

    #[test]
    fn test_role_home_paths() {
        assert_eq!(Role::Admin.home_path(), "/admin/dashboard");
        assert_eq!(Role::Staff.home_path(), "/staff/dashboard");
        assert_eq!(Role::Citizen.home_path(), "/user/dashboard");
    }

    #[test]
    fn test_role_fallback_paths() {
        assert_eq!(Role::Admin.fallback_path(), "/admin/dashboard");
        assert_eq!(Role::Staff.fallback_path(), "/admin/dashboard");
        assert_eq!(Role::Citizen.fallback_path(), "/user/dashboard");
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), r#""staff""#);
        let role: Role = serde_json::from_str(r#""admin""#).unwrap();
        assert_eq!(role, Role::Admin);
    }
}
