use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Farmer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Farmer => "farmer",
        }
    }

    pub fn signup_path(&self) -> String {
        format!("/{}/signup", self.as_str())
    }

    pub fn login_path(&self) -> String {
        format!("/{}/login", self.as_str())
    }

    pub fn list_path(&self) -> String {
        format!("/{}/getAll", self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" => Ok(Role::Buyer),
            "farmer" => Ok(Role::Farmer),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}
