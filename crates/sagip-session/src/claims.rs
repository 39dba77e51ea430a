//! Unverified JWT claim inspection.
//!
//! The client never validates signatures; this only reads the payload for
//! display (who is signed in, when the access token lapses). Access
//! decisions rely on the server's 401.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::SessionError;

/// Claims carried by the backend's access and refresh tokens.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenClaims {
    /// Expiry as a Unix timestamp.
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issue time as a Unix timestamp.
    #[serde(default)]
    pub iat: Option<i64>,
    /// `access` or `refresh`.
    #[serde(default)]
    pub token_type: Option<String>,
    /// Backend user ID.
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
}

impl TokenClaims {
    /// Decode the payload segment of a JWT without verifying it.
    pub fn peek(token: &str) -> Result<Self, SessionError> {
        let mut parts = token.split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return Err(SessionError::MalformedToken("expected three segments".into())),
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| SessionError::MalformedToken(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| SessionError::MalformedToken(e.to_string()))
    }

    /// Expiry time, if the token carries one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Check expiry against a Unix timestamp.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.map(|exp| now >= exp).unwrap_or(false)
    }

    /// Check expiry against the system clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}
