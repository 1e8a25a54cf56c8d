pub mod auth;
pub mod catalog;
pub mod listing;
pub mod profile;
pub mod role;
pub mod route;
pub mod session;
