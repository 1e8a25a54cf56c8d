use crate::models::role::Role;
use crate::util::string_or_number;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

static MOBILE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("valid mobile regex"));

#[derive(Serialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BuyerSignupRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(regex(path = *MOBILE_RE))]
    pub mobile: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 1))]
    pub company_name: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub state: String,
}

#[derive(Serialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FarmerSignupRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(regex(path = *MOBILE_RE))]
    pub mobile: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 1))]
    pub farm_address: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub state: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum SignupRequest {
    Buyer(BuyerSignupRequest),
    Farmer(FarmerSignupRequest),
}

impl SignupRequest {
    pub fn role(&self) -> Role {
        match self {
            SignupRequest::Buyer(_) => Role::Buyer,
            SignupRequest::Farmer(_) => Role::Farmer,
        }
    }

    /// Required fields in form order, used for the "fill all fields" check.
    pub fn required_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        match self {
            SignupRequest::Buyer(r) => vec![
                ("name", Some(r.name.as_str())),
                ("email", Some(r.email.as_str())),
                ("mobile", Some(r.mobile.as_str())),
                ("password", Some(r.password.as_str())),
                ("company_name", Some(r.company_name.as_str())),
                ("city", Some(r.city.as_str())),
                ("state", Some(r.state.as_str())),
            ],
            SignupRequest::Farmer(r) => vec![
                ("name", Some(r.name.as_str())),
                ("email", Some(r.email.as_str())),
                ("mobile", Some(r.mobile.as_str())),
                ("password", Some(r.password.as_str())),
                ("farm_address", Some(r.farm_address.as_str())),
                ("city", Some(r.city.as_str())),
                ("state", Some(r.state.as_str())),
            ],
        }
    }

    pub fn validate(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            SignupRequest::Buyer(r) => r.validate(),
            SignupRequest::Farmer(r) => r.validate(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(from = "LoginResponseBody")]
pub struct LoginResponse {
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub message: Option<String>,
}

/// Login body as sent. The user id has appeared under several keys, sometimes
/// more than one at once, and as a number.
#[derive(Deserialize)]
struct LoginResponseBody {
    #[serde(default)]
    token: Option<String>,
    #[serde(rename = "User ID", default, deserialize_with = "string_or_number")]
    spaced_user_id: Option<String>,
    #[serde(rename = "userId", default, deserialize_with = "string_or_number")]
    camel_user_id: Option<String>,
    #[serde(rename = "user_id", default, deserialize_with = "string_or_number")]
    snake_user_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl From<LoginResponseBody> for LoginResponse {
    fn from(body: LoginResponseBody) -> Self {
        Self {
            token: body.token,
            user_id: body.spaced_user_id.or(body.camel_user_id).or(body.snake_user_id),
            message: body.message,
        }
    }
}

/// Body the backend uses for plain acknowledgements and error reports.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiMessage {
    pub fn text(self) -> Option<String> {
        self.message.or(self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn buyer() -> BuyerSignupRequest {
        BuyerSignupRequest {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            mobile: "9876543210".to_string(),
            password: "secret1".to_string(),
            company_name: "Asha Traders".to_string(),
            city: "Nashik".to_string(),
            state: "MH".to_string(),
        }
    }

    #[test]
    fn valid_buyer_signup_passes() {
        assert!(SignupRequest::Buyer(buyer()).validate().is_ok());
    }

    #[test]
    fn bad_mobile_rejected() {
        let mut request = buyer();
        request.mobile = "12345".to_string();
        let errors = SignupRequest::Buyer(request).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("mobile"));
    }

    #[test]
    fn signup_serializes_camel_case() {
        let value = serde_json::to_value(SignupRequest::Buyer(buyer())).unwrap();
        assert_eq!(value["companyName"], "Asha Traders");
        assert!(value.get("role").is_none());
    }

    #[test]
    fn login_response_reads_spaced_user_id() {
        let response: LoginResponse = serde_json::from_value(json!({"token": "T", "User ID": "U1", "message": "ok"})).unwrap();
        assert_eq!(response.token.as_deref(), Some("T"));
        assert_eq!(response.user_id.as_deref(), Some("U1"));
    }

    #[test]
    fn login_response_accepts_numeric_and_repeated_user_id() {
        let response: LoginResponse = serde_json::from_value(json!({"token": "T", "User ID": 42, "message": "ok"})).unwrap();
        assert_eq!(response.user_id.as_deref(), Some("42"));

        let response: LoginResponse = serde_json::from_value(json!({"token": "T", "User ID": "U1", "userId": "U1"})).unwrap();
        assert_eq!(response.token.as_deref(), Some("T"));
        assert_eq!(response.user_id.as_deref(), Some("U1"));

        let response: LoginResponse = serde_json::from_value(json!({"token": "T", "userId": 7})).unwrap();
        assert_eq!(response.user_id.as_deref(), Some("7"));
    }

    #[test]
    fn api_message_prefers_message_field() {
        let body: ApiMessage = serde_json::from_value(json!({"message": "Email exists", "error": "conflict"})).unwrap();
        assert_eq!(body.text().as_deref(), Some("Email exists"));
        let body: ApiMessage = serde_json::from_value(json!({"error": "bad"})).unwrap();
        assert_eq!(body.text().as_deref(), Some("bad"));
    }
}
