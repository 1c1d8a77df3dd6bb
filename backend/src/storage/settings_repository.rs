//! YAML-backed settings repository.
//!
//! A single `UserSettings` record lives in `settings.yaml`. Loading always
//! runs the record through `normalize` so a hand-edited or older file gets
//! its missing campus rates back-filled and out-of-range values clamped
//! before the domain sees them.

use anyhow::Result;
use shared::UserSettings;
use std::fs;
use tracing::{debug, info};

use super::connection::StoreConnection;

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    connection: StoreConnection,
}

impl SettingsRepository {
    pub fn new(connection: StoreConnection) -> Self {
        Self { connection }
    }

    /// Load the settings record, creating the file with defaults on first
    /// run.
    pub fn load_or_create(&self) -> Result<UserSettings> {
        let path = self.connection.settings_file_path();

        if !path.exists() {
            let settings = UserSettings::default();
            self.save(&settings)?;
            info!("Created default settings at {}", path.display());
            return Ok(settings);
        }

        let contents = fs::read_to_string(&path)?;
        let mut settings: UserSettings = serde_yaml::from_str(&contents)?;
        settings.normalize();
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Persist the settings record, atomically.
    pub fn save(&self, settings: &UserSettings) -> Result<()> {
        let path = self.connection.settings_file_path();
        let temp_path = path.with_extension("tmp");

        let contents = serde_yaml::to_string(settings)?;
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }
}
