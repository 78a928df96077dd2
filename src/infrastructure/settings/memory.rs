//! In-memory settings store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::settings::{SettingKey, SettingsStore};
use crate::domain::shared::result::Result;

#[derive(Default)]
pub struct MemorySettingsStore {
    values: RwLock<HashMap<SettingKey, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: SettingKey, value: impl Into<String>) -> Self {
        self.values.get_mut().insert(key, value.into());
        self
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: SettingKey) -> Result<String> {
        Ok(self.values.read().await.get(&key).cloned().unwrap_or_default())
    }

    async fn set(&self, key: SettingKey, value: &str) -> Result<()> {
        self.values.write().await.insert(key, value.to_string());
        Ok(())
    }
}
