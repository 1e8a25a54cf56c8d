use crate::models::role::Role;
use serde::Serialize;
use std::fmt;

/// Screen the client moves to after an action completes.
#[derive(Serialize, Debug, Copy, Clone, Eq, PartialEq)]
#[serde(tag = "screen", content = "role", rename_all = "snake_case")]
pub enum Route {
    Login(Role),
    Dashboard(Role),
    AddDemand,
    AddCropListing,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login(role) => write!(f, "{role}/login"),
            Route::Dashboard(role) => write!(f, "{role}/dashboard"),
            Route::AddDemand => f.write_str("buyer/add-demand"),
            Route::AddCropListing => f.write_str("farmer/add-crop-listing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_display() {
        assert_eq!(Route::Dashboard(Role::Farmer).to_string(), "farmer/dashboard");
        assert_eq!(Route::Login(Role::Buyer).to_string(), "buyer/login");
        assert_eq!(Route::AddDemand.to_string(), "buyer/add-demand");
    }
}
