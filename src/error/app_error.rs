use reqwest::StatusCode;
use thiserror::Error;
use validator::ValidationErrors;

pub const FILL_ALL_FIELDS: &str = "Fill all fields";
pub const GENERIC_SERVER_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),
    #[error("Server not reachable")]
    Network {
        message: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{message}")]
    Server { status: StatusCode, message: String },
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Profile not found for {0}")]
    ProfileNotFound(String),
    #[error("Unexpected response: {0}")]
    UnexpectedPayload(String),
    #[error("A submission is already in progress")]
    SubmissionInFlight,
    #[error("Request cancelled")]
    Cancelled,
    #[error("Storage error")]
    Storage {
        message: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Storage error")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Configuration error")]
    ConfigurationError {
        message: String,
        #[source]
        source: figment::Error,
    },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn missing_fields() -> Self {
        Self::Validation(FILL_ALL_FIELDS.to_string())
    }

    pub fn network(message: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            message: message.into(),
            source,
        }
    }

    pub fn storage(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            message: message.into(),
            source,
        }
    }

    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Builds a server-rejected error, falling back to a generic message when
    /// the body carried none.
    pub fn server(status: StatusCode, message: Option<String>) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_SERVER_MESSAGE.to_string());
        Self::Server { status, message }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_) | AppError::ValidationError(_))
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::storage("Session storage unavailable", e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::serialization("Failed to (de)serialize JSON", e)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::network("Request to backend failed", e)
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::ConfigurationError {
            message: "Failed to read configuration".to_string(),
            source: e,
        }
    }
}
