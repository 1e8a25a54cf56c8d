use crate::error::app_error::AppError;
use crate::models::role::Role;
use crate::models::route::Route;
use crate::models::session::{Session, TokenClaims};
use crate::store::session_store::SessionStore;
use crate::util::normalize_email;
use chrono::Utc;
use tracing::{debug, info, warn};

/// Outcome of entering a role-scoped screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// No usable session; the screen must hand over to this route.
    Redirect(Route),
    Ready(Session),
}

/// One-shot session check run when a role-scoped screen is entered.
pub struct SessionResolver<'a> {
    sessions: &'a SessionStore,
}

impl<'a> SessionResolver<'a> {
    pub fn new(sessions: &'a SessionStore) -> Self {
        SessionResolver { sessions }
    }

    pub async fn enter(&self, role: Role) -> Result<Entry, AppError> {
        let Some(mut session) = self.sessions.load(role).await? else {
            debug!(role = %role, "no stored token");
            return Ok(Entry::Redirect(Route::Login(role)));
        };

        if session.role != role {
            info!(stored = %session.role, requested = %role, "session belongs to another role");
            return Ok(Entry::Redirect(Route::Login(role)));
        }

        if let Some(claims) = TokenClaims::decode(&session.token) {
            if claims.is_expired(Utc::now()) {
                warn!(role = %role, expires_at = ?claims.expires_at(), "stored token looks expired");
            }

            if session.login_email.is_none()
                && let Some(email) = claims.login_email()
            {
                let email = normalize_email(email);
                self.sessions.set_login_email(&email).await?;
                session.login_email = Some(email);
            }
        }

        Ok(Entry::Ready(session))
    }

    /// Like [`enter`](Self::enter) for callers that cannot redirect.
    pub async fn require(&self, role: Role) -> Result<Session, AppError> {
        match self.enter(role).await? {
            Entry::Ready(session) => Ok(session),
            Entry::Redirect(_) => Err(AppError::NotLoggedIn),
        }
    }
}
