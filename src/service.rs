pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod identity;
pub mod listing;
pub mod scope;
pub mod session;
