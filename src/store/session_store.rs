use crate::error::app_error::AppError;
use crate::models::role::Role;
use crate::models::session::Session;
use crate::store::{KeyValueStore, StorageKey};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Typed view over the persisted session keys. Nothing else in the crate
/// touches the raw key-value store.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    pub async fn token(&self) -> Result<Option<String>, AppError> {
        Ok(self.inner.get(StorageKey::Token).await?.filter(|t| !t.trim().is_empty()))
    }

    /// Reads the stored session, or `None` when no token is present. A token
    /// stored without a role is attributed to `fallback_role`.
    pub async fn load(&self, fallback_role: Role) -> Result<Option<Session>, AppError> {
        let Some(token) = self.token().await? else {
            return Ok(None);
        };

        let role = match self.inner.get(StorageKey::Role).await? {
            Some(raw) => raw.parse::<Role>().unwrap_or_else(|e| {
                warn!(error = %e, fallback = %fallback_role, "stored role unreadable");
                fallback_role
            }),
            None => fallback_role,
        };

        Ok(Some(Session {
            token,
            role,
            user_id: self.inner.get(StorageKey::UserId).await?,
            login_email: self.inner.get(StorageKey::LoginEmail).await?,
            buyer_id: self.inner.get(StorageKey::BuyerId).await?,
            farmer_id: self.inner.get(StorageKey::FarmerId).await?,
        }))
    }

    /// Persists a freshly issued session in one write. Keys the session does
    /// not carry are removed so values from a previous login cannot leak into
    /// this one, and a failed write leaves the previous session whole.
    pub async fn begin(&self, session: &Session) -> Result<(), AppError> {
        let mut entries = vec![
            (StorageKey::Token, session.token.clone()),
            (StorageKey::Role, session.role.as_str().to_string()),
        ];
        if let Some(user_id) = &session.user_id {
            entries.push((StorageKey::UserId, user_id.clone()));
        }
        if let Some(email) = &session.login_email {
            entries.push((StorageKey::LoginEmail, email.clone()));
        }
        self.inner.replace_all(&entries).await?;
        info!(role = %session.role, has_user_id = session.user_id.is_some(), "session stored");
        Ok(())
    }

    pub async fn cache_profile_id(&self, role: Role, id: &str) -> Result<(), AppError> {
        self.inner.set(profile_key(role), id).await?;
        debug!(role = %role, profile_id = %id, "profile id cached");
        Ok(())
    }

    pub async fn set_login_email(&self, email: &str) -> Result<(), AppError> {
        self.inner.set(StorageKey::LoginEmail, email).await
    }

    /// Removes every session key.
    pub async fn clear(&self) -> Result<(), AppError> {
        self.inner.remove_all(&StorageKey::ALL).await?;
        info!("session cleared");
        Ok(())
    }
}

fn profile_key(role: Role) -> StorageKey {
    match role {
        Role::Buyer => StorageKey::BuyerId,
        Role::Farmer => StorageKey::FarmerId,
    }
}
