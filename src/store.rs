pub mod file;
pub mod memory;
pub mod session_store;

use crate::error::app_error::AppError;
use std::fmt;

/// Keys persisted between runs. The string forms match what the mobile app
/// wrote, so an exported session file stays readable by both.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StorageKey {
    Token,
    UserId,
    BuyerId,
    FarmerId,
    LoginEmail,
    Role,
}

impl StorageKey {
    pub const ALL: [StorageKey; 6] = [
        StorageKey::Token,
        StorageKey::UserId,
        StorageKey::BuyerId,
        StorageKey::FarmerId,
        StorageKey::LoginEmail,
        StorageKey::Role,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Token => "token",
            StorageKey::UserId => "userId",
            StorageKey::BuyerId => "buyerId",
            StorageKey::FarmerId => "farmerId",
            StorageKey::LoginEmail => "loginEmail",
            StorageKey::Role => "role",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistent key-value storage. No expiry; concurrent writers to the same
/// key are last-write-wins.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set(&self, key: StorageKey, value: &str) -> Result<(), AppError>;
    async fn get(&self, key: StorageKey) -> Result<Option<String>, AppError>;
    async fn remove_all(&self, keys: &[StorageKey]) -> Result<(), AppError>;
    /// Drops every [`StorageKey`] and stores `entries` as one write.
    async fn replace_all(&self, entries: &[(StorageKey, String)]) -> Result<(), AppError>;
}
