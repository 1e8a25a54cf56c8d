pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
mod util;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use error::alert::Alert;
pub use error::app_error::AppError;

use crate::api::MarketplaceApi;
use crate::api::http::HttpApi;
use crate::store::file::FileStore;
use crate::store::session_store::SessionStore;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Everything a screen needs: the backend and the persisted session.
/// Built once and passed down instead of living in globals.
#[derive(Clone)]
pub struct AppContext {
    pub api: Arc<dyn MarketplaceApi>,
    pub sessions: SessionStore,
}

impl AppContext {
    pub fn new(api: Arc<dyn MarketplaceApi>, sessions: SessionStore) -> Self {
        Self { api, sessions }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let api = HttpApi::new(&config.api)?;
        let path = config.storage.session_path();
        debug!(base_url = %api.base_url(), session_file = %path.display(), "building app context");

        Ok(Self::new(Arc::new(api), SessionStore::new(Arc::new(FileStore::new(path)))))
    }
}

pub fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence over the configured level, e.g.
    //   RUST_LOG=mandi_connect::api=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    if json_format {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
