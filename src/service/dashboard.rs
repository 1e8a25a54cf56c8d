use crate::AppContext;
use crate::error::app_error::AppError;
use crate::models::profile::{Identity, Profile};
use crate::models::role::Role;
use crate::models::route::Route;
use crate::models::session::Session;
use crate::service::identity::{CachePolicy, IdentityResolver};
use crate::service::session::{Entry, SessionResolver};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Demands,
    Listings,
    Market,
    Profile,
}

const BUYER_TABS: [Tab; 3] = [Tab::Demands, Tab::Market, Tab::Profile];
const FARMER_TABS: [Tab; 3] = [Tab::Listings, Tab::Market, Tab::Profile];

impl Tab {
    pub fn for_role(role: Role) -> &'static [Tab] {
        match role {
            Role::Buyer => &BUYER_TABS,
            Role::Farmer => &FARMER_TABS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Demands => "demands",
            Tab::Listings => "listings",
            Tab::Market => "market",
            Tab::Profile => "profile",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "demands" => Ok(Tab::Demands),
            "listings" => Ok(Tab::Listings),
            "market" => Ok(Tab::Market),
            "profile" => Ok(Tab::Profile),
            other => Err(AppError::validation(format!("Unknown tab '{other}'"))),
        }
    }
}

/// Role-scoped view state. Only the session store outlives it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub role: Role,
    pub identity: Identity,
    pub profile: Option<Profile>,
    #[serde(skip)]
    pub session: Session,
    active_tab: Tab,
}

impl Dashboard {
    pub fn new(session: Session, identity: Identity, profile: Option<Profile>) -> Self {
        let role = session.role;
        Self {
            role,
            identity,
            profile,
            session,
            active_tab: Tab::for_role(role)[0],
        }
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn tabs(&self) -> &'static [Tab] {
        Tab::for_role(self.role)
    }

    pub fn select(&mut self, tab: Tab) -> Result<(), AppError> {
        if !self.tabs().contains(&tab) {
            return Err(AppError::validation(format!("The {tab} tab is not available to a {}", self.role)));
        }
        self.active_tab = tab;
        Ok(())
    }

    /// Where the primary action of the active tab leads.
    pub fn primary_action(&self) -> Option<Route> {
        match self.active_tab {
            Tab::Demands => Some(Route::AddDemand),
            Tab::Listings => Some(Route::AddCropListing),
            Tab::Market | Tab::Profile => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEntry {
    Redirect(Route),
    Ready(Box<Dashboard>),
}

/// Token store, session check, identity match, then the role's view.
pub async fn open_dashboard(ctx: &AppContext, role: Role, policy: CachePolicy) -> Result<DashboardEntry, AppError> {
    let mut session = match SessionResolver::new(&ctx.sessions).enter(role).await? {
        Entry::Redirect(route) => return Ok(DashboardEntry::Redirect(route)),
        Entry::Ready(session) => session,
    };

    let resolved = IdentityResolver::new(ctx).resolve(&mut session, policy).await?;
    Ok(DashboardEntry::Ready(Box::new(Dashboard::new(session, resolved.identity, resolved.profile))))
}
