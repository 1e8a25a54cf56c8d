use crate::AppContext;
use crate::error::app_error::AppError;
use crate::models::auth::{LoginRequest, SignupRequest};
use crate::models::role::Role;
use crate::models::route::Route;
use crate::models::session::Session;
use crate::util::{blank_fields, normalize_email};
use tracing::{info, warn};
use validator::Validate;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub route: Route,
    pub session: Session,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SignupOutcome {
    pub route: Route,
    pub message: Option<String>,
}

pub struct AuthService<'a> {
    ctx: &'a AppContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        AuthService { ctx }
    }

    /// Registers a buyer or farmer. The request is consumed so no form state
    /// outlives a successful signup.
    pub async fn signup(&self, request: SignupRequest) -> Result<SignupOutcome, AppError> {
        if !blank_fields(&request.required_fields()).is_empty() {
            return Err(AppError::missing_fields());
        }
        request.validate()?;

        let role = request.role();
        let message = self.ctx.api.signup(&request).await?;
        info!(role = %role, "signup accepted");

        Ok(SignupOutcome {
            route: Route::Login(role),
            message,
        })
    }

    /// Logs in and persists the session. Nothing is written unless the
    /// backend answered with a token.
    pub async fn login(&self, role: Role, request: LoginRequest) -> Result<LoginOutcome, AppError> {
        if !blank_fields(&[("email", Some(request.email.as_str())), ("password", Some(request.password.as_str()))]).is_empty() {
            return Err(AppError::missing_fields());
        }
        let request = LoginRequest {
            email: request.email.trim().to_string(),
            password: request.password,
        };
        request.validate()?;

        let response = self.ctx.api.login(role, &request).await.inspect_err(|e| {
            warn!(role = %role, error = %e, "login rejected");
        })?;

        let token = response
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::UnexpectedPayload("login response without token".to_string()))?;

        let session = Session {
            token,
            role,
            user_id: response.user_id.filter(|id| !id.trim().is_empty()),
            login_email: Some(normalize_email(&request.email)),
            buyer_id: None,
            farmer_id: None,
        };
        self.ctx.sessions.begin(&session).await?;
        info!(role = %role, "login succeeded");

        Ok(LoginOutcome {
            route: Route::Dashboard(role),
            session,
            message: response.message,
        })
    }

    pub async fn logout(&self, role: Role) -> Result<Route, AppError> {
        self.ctx.sessions.clear().await?;
        Ok(Route::Login(role))
    }
}
