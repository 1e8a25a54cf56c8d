use crate::error::app_error::AppError;
use serde::Serialize;
use std::fmt;

/// User-facing modal message derived from a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: &'static str,
    pub message: String,
}

impl Alert {
    pub fn new(title: &'static str, message: impl Into<String>) -> Self {
        Self {
            title,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new("Success", message)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

impl From<&AppError> for Alert {
    fn from(e: &AppError) -> Self {
        match e {
            AppError::Validation(message) => Alert::new("Validation", message.clone()),
            AppError::ValidationError(errors) => Alert::new("Validation", describe_validation(errors)),
            AppError::Network { .. } => Alert::new("Network Error", "Server not reachable"),
            AppError::Server { message, .. } => Alert::new("Error", message.clone()),
            AppError::InvalidCredentials => Alert::new("Login Failed", "Invalid credentials"),
            AppError::Unauthorized => Alert::new("Session Expired", "Please log in again"),
            AppError::NotLoggedIn => Alert::new("Session", "Please log in first"),
            AppError::ProfileNotFound(_) => Alert::new("Profile", "Profile not found"),
            AppError::UnexpectedPayload(_) => Alert::new("Error", "Unexpected response from server"),
            AppError::SubmissionInFlight => Alert::new("Please wait", "Submission already in progress"),
            AppError::Cancelled => Alert::new("Cancelled", "Request cancelled"),
            AppError::Storage { .. } | AppError::Serialization { .. } => Alert::new("Storage Error", "Could not access local session"),
            AppError::ConfigurationError { .. } => Alert::new("Configuration Error", "Could not read configuration"),
        }
    }
}

fn describe_validation(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
    fields.sort_unstable();
    if fields.is_empty() {
        "Invalid input".to_string()
    } else {
        format!("Invalid value for: {}", fields.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn invalid_credentials_alert() {
        let alert = Alert::from(&AppError::InvalidCredentials);
        assert_eq!(alert.message, "Invalid credentials");
    }

    #[test]
    fn server_alert_carries_body_message() {
        let alert = Alert::from(&AppError::server(StatusCode::BAD_REQUEST, Some("Crop missing".to_string())));
        assert_eq!(alert, Alert::new("Error", "Crop missing"));
    }

    #[test]
    fn validation_alert_keeps_message() {
        let alert = Alert::from(&AppError::missing_fields());
        assert_eq!(alert.to_string(), "Validation: Fill all fields");
    }
}
