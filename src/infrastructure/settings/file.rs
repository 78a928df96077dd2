//! Settings persisted as a flat TOML table

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::settings::{SettingKey, SettingsStore};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;

type Table = BTreeMap<String, String>;

pub struct TomlFileSettingsStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl TomlFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_table(&self) -> Result<Table> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => toml::from_str(&text).map_err(|e| {
                DomainError::Storage(format!(
                    "{} is not a settings file: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Table::new()),
            Err(e) => Err(DomainError::Storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn write_table(&self, table: &Table) -> Result<()> {
        let text = toml::to_string(table)
            .map_err(|e| DomainError::Storage(format!("Failed to encode settings: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        tokio::fs::write(&self.path, text).await.map_err(|e| {
            DomainError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl SettingsStore for TomlFileSettingsStore {
    async fn get(&self, key: SettingKey) -> Result<String> {
        let table = self.read_table().await?;
        Ok(table.get(key.as_str()).cloned().unwrap_or_default())
    }

    async fn set(&self, key: SettingKey, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut table = self.read_table().await?;
        table.insert(key.as_str().to_string(), value.to_string());
        self.write_table(&table).await?;
        debug!("Saved {} to {}", key, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlFileSettingsStore::new(dir.path().join("settings.toml"));
        assert_eq!(store.get(SettingKey::TokenUrl).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_round_trip_through_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let store = TomlFileSettingsStore::new(&path);
        store
            .set(SettingKey::TokenUrl, "https://tokens.example/token?user=a&b=\"c\"")
            .await
            .unwrap();
        store.set(SettingKey::Number, "+15550100").await.unwrap();

        let reloaded = TomlFileSettingsStore::new(&path);
        assert_eq!(
            reloaded.get(SettingKey::TokenUrl).await.unwrap(),
            "https://tokens.example/token?user=a&b=\"c\""
        );
        assert_eq!(reloaded.get(SettingKey::Number).await.unwrap(), "+15550100");
    }

    #[tokio::test]
    async fn test_uses_popup_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let store = TomlFileSettingsStore::new(&path);
        store.set(SettingKey::Number, "123").await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("number = \"123\""));
    }

    #[tokio::test]
    async fn test_garbage_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let store = TomlFileSettingsStore::new(&path);
        assert!(matches!(
            store.get(SettingKey::Number).await,
            Err(DomainError::Storage(_))
        ));
    }
}
