use crate::models::role::Role;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Client-held record of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub user_id: Option<String>,
    pub login_email: Option<String>,
    pub buyer_id: Option<String>,
    pub farmer_id: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
            user_id: None,
            login_email: None,
            buyer_id: None,
            farmer_id: None,
        }
    }

    /// Profile id cached for the session's own role, if any.
    pub fn cached_profile_id(&self) -> Option<&str> {
        match self.role {
            Role::Buyer => self.buyer_id.as_deref(),
            Role::Farmer => self.farmer_id.as_deref(),
        }
    }

    pub fn set_cached_profile_id(&mut self, id: &str) {
        let slot = match self.role {
            Role::Buyer => &mut self.buyer_id,
            Role::Farmer => &mut self.farmer_id,
        };
        *slot = Some(id.to_string());
    }
}

/// Claims read from the token payload. The signature is never checked here;
/// the backend remains the only authority on token validity.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub sub: Option<String>,
    #[serde(alias = "Email")]
    pub email: Option<String>,
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub fn decode(token: &str) -> Option<Self> {
        let payload = token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| expires_at <= now)
    }

    /// Email claim, falling back to `sub` when it looks like an address.
    pub fn login_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .or_else(|| self.sub.as_deref().filter(|sub| sub.contains('@')))
    }
}

#[cfg(test)]
pub(crate) fn encode_test_token(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}
