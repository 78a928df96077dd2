//! Persisted popup settings port

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::result::Result;

/// Keys the popup persists between sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingKey {
    /// Endpoint the token is fetched from
    TokenUrl,
    /// Last dialed phone number
    Number,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::TokenUrl => "tokenUrl",
            SettingKey::Number => "number",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value store for popup settings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Stored value, or the empty string when never set
    async fn get(&self, key: SettingKey) -> Result<String>;

    async fn set(&self, key: SettingKey, value: &str) -> Result<()>;
}
