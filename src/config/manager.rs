use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

fn serialize_mode<S>(mode: &u32, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format!("{mode:o}"))
}

fn deserialize_mode<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let octal = String::deserialize(deserializer)?;
    u32::from_str_radix(octal.trim_start_matches("0o"), 8).map_err(serde::de::Error::custom)
}

fn app_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("opsmenu")
}

/// Application settings
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    /// Sessions prewarmed in the pool, which is also the upload concurrency
    pub max_upload_clients: usize,
    /// Permission bits applied to every uploaded file, written as octal
    #[serde(serialize_with = "serialize_mode", deserialize_with = "deserialize_mode")]
    pub upload_permissions: u32,
    /// Extra passes over the whole batch when a pass reports failures
    pub upload_retries: usize,
    /// Root directory of the JSON profile documents
    pub profile_dir: PathBuf,
    pub sync_local_dir: Option<String>,
    pub sync_remote_dir: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            max_upload_clients: 5,
            upload_permissions: 0o755,
            upload_retries: 3,
            profile_dir: app_config_dir().join("profiles"),
            sync_local_dir: None,
            sync_remote_dir: None,
        }
    }
}

impl AppSettings {
    /// Validates the settings
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_clients == 0 {
            return Err(AppError::ValidationError(
                "max_upload_clients must be greater than 0".to_string(),
            ));
        }

        if self.upload_permissions > 0o7777 {
            return Err(AppError::ValidationError(format!(
                "upload_permissions {:o} is not a valid mode",
                self.upload_permissions
            )));
        }

        Ok(())
    }
}

/// Loads and persists [`AppSettings`] as TOML
pub struct SettingsManager {
    settings_path: PathBuf,
    settings: AppSettings,
}

impl SettingsManager {
    /// Load settings from the default location, writing defaults on first run
    pub fn new() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::with_path(settings_path)
    }

    /// Create a settings manager with a custom path (useful for testing)
    pub fn with_path<P: AsRef<Path>>(settings_path: P) -> Result<Self> {
        let settings_path = settings_path.as_ref().to_path_buf();
        let existed = settings_path.exists();
        let settings = Self::load_settings_from_path(&settings_path)?;
        settings.validate()?;

        let manager = Self {
            settings_path,
            settings,
        };
        if !existed {
            manager.save()?;
        }
        Ok(manager)
    }

    /// Get the default settings file path
    fn get_settings_path() -> Result<PathBuf> {
        let config_dir = app_config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).map_err(|e| {
                AppError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        Ok(config_dir.join("settings.toml"))
    }

    /// Load settings from the specified path
    fn load_settings_from_path(settings_path: &Path) -> Result<AppSettings> {
        if !settings_path.exists() {
            return Ok(AppSettings::default());
        }

        let content = fs::read_to_string(settings_path)
            .map_err(|e| AppError::ConfigError(format!("Failed to read settings file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse settings file: {}", e)))
    }

    /// Persist current settings to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }
        let toml = toml::to_string_pretty(&self.settings)
            .map_err(|e| AppError::ConfigError(format!("Failed to serialize settings: {}", e)))?;
        fs::write(&self.settings_path, toml)
            .map_err(|e| AppError::ConfigError(format!("Failed to write settings: {}", e)))?;
        Ok(())
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn into_settings(self) -> AppSettings {
        self.settings
    }
}
