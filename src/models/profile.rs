use crate::error::app_error::AppError;
use crate::models::role::Role;
use crate::util::{flexible_bool, normalize_email, string_or_number};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Profile payload exactly as the backend sends it. Field casing differs
/// between endpoints, so every known spelling is accepted here and nowhere else.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ProfilePayload {
    #[serde(alias = "_id", alias = "Id", default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(alias = "Name", alias = "fullName", default)]
    pub name: Option<String>,
    #[serde(alias = "Email", default)]
    pub email: Option<String>,
    #[serde(alias = "Mobile", alias = "mobileNumber", default, deserialize_with = "string_or_number")]
    pub mobile: Option<String>,
    #[serde(alias = "companyName", alias = "CompanyName", default)]
    pub company_name: Option<String>,
    #[serde(alias = "farmAddress", alias = "FarmAddress", default)]
    pub farm_address: Option<String>,
    #[serde(alias = "City", default)]
    pub city: Option<String>,
    #[serde(alias = "State", default)]
    pub state: Option<String>,
    #[serde(alias = "isVerified", alias = "Verified", default, deserialize_with = "flexible_bool")]
    pub verified: Option<bool>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProfileDetails {
    Buyer { company_name: Option<String> },
    Farmer { farm_address: Option<String> },
}

/// Normalized buyer or farmer account record.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub role: Role,
    pub name: Option<String>,
    pub email: String,
    pub mobile: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub verified: bool,
    pub details: ProfileDetails,
}

impl Profile {
    /// Maps one raw payload. Records without an id or an email cannot take
    /// part in identity matching and are rejected instead of defaulted.
    pub fn from_payload(role: Role, payload: ProfilePayload) -> Result<Self, AppError> {
        let id = non_blank(payload.id).ok_or_else(|| AppError::UnexpectedPayload(format!("{role} profile without id")))?;
        let email =
            non_blank(payload.email).ok_or_else(|| AppError::UnexpectedPayload(format!("{role} profile {id} without email")))?;

        let details = match role {
            Role::Buyer => ProfileDetails::Buyer {
                company_name: non_blank(payload.company_name),
            },
            Role::Farmer => ProfileDetails::Farmer {
                farm_address: non_blank(payload.farm_address),
            },
        };

        Ok(Self {
            id,
            role,
            name: non_blank(payload.name),
            email,
            mobile: non_blank(payload.mobile),
            city: non_blank(payload.city),
            state: non_blank(payload.state),
            verified: payload.verified.unwrap_or(false),
            details,
        })
    }

    /// Maps one record from a profile listing, shape checks included.
    pub fn from_value(role: Role, value: Value) -> Result<Self, AppError> {
        let payload: ProfilePayload =
            serde_json::from_value(value).map_err(|e| AppError::UnexpectedPayload(format!("{role} profile record: {e}")))?;
        Self::from_payload(role, payload)
    }

    pub fn matches_email(&self, email: &str) -> bool {
        normalize_email(&self.email) == normalize_email(email)
    }
}

/// Weak reference to a matched profile kept in the session store.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl From<&Profile> for Identity {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.clone(),
            email: profile.email.clone(),
            role: profile.role,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
