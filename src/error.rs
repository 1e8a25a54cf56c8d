pub mod alert;
pub mod app_error;
