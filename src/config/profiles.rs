use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::store::{Profile, ProfileKind, ProfileStore};
use crate::error::{AppError, Result};
use crate::ui::Ui;

fn default_port() -> u16 {
    22
}

/// Credentials of the SFTP endpoint, stored per user.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SftpProfile {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub password: String,
}

impl Default for SftpProfile {
    fn default() -> Self {
        Self::new("", default_port(), "", "")
    }
}

impl SftpProfile {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user_name: user_name.into(),
            password: password.into(),
        }
    }

    pub fn host_port(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Profile for SftpProfile {
    const NAME: &'static str = "SftpProfile";

    fn complete(&mut self, ui: &dyn Ui) -> Result<bool> {
        let mut changed = false;

        if self.host.trim().is_empty() {
            self.host = ui.prompt("SFTP host:", None)?.trim().to_string();
            changed = true;
        }

        if self.port == 0 {
            let port = ui.prompt("SFTP port:", Some("22"))?;
            self.port = port.trim().parse().map_err(|_| {
                AppError::ValidationError(format!("'{}' is not a valid port", port.trim()))
            })?;
            changed = true;
        }

        if self.user_name.trim().is_empty() {
            self.user_name = ui.prompt("SFTP user name:", None)?.trim().to_string();
            changed = true;
        }

        if self.password.is_empty() {
            self.password = ui.prompt_secret("SFTP password:")?;
            changed = true;
        }

        Ok(changed)
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AppError::ConfigIncomplete("SFTP host".to_string()));
        }
        if self.port == 0 {
            return Err(AppError::ConfigIncomplete("SFTP port".to_string()));
        }
        if self.user_name.trim().is_empty() {
            return Err(AppError::ConfigIncomplete("SFTP user name".to_string()));
        }
        if self.password.is_empty() {
            return Err(AppError::ConfigIncomplete("SFTP password".to_string()));
        }
        Ok(())
    }
}

/// File names skipped by every sync and upload, shared by all users.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct IgnoreList {
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl IgnoreList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignore: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact file-name match; no globbing.
    pub fn is_ignored(&self, file_name: &str) -> bool {
        self.ignore.iter().any(|name| name == file_name)
    }
}

impl Profile for IgnoreList {
    const NAME: &'static str = "IgnoreList";
    const PER_USER: bool = false;

    fn complete(&mut self, ui: &dyn Ui) -> Result<bool> {
        if !self.ignore.is_empty() {
            return Ok(false);
        }

        let answer = ui.prompt(
            "File names to ignore, separated by commas:",
            Some(".DS_Store"),
        )?;
        self.ignore = answer
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        Ok(true)
    }
}

/// Last user name that logged in, used as the default at the next start.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginRecord {
    #[serde(default)]
    pub last_login: String,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl LoginRecord {
    /// Remember `user_name`; returns whether anything changed.
    pub fn record(&mut self, user_name: &str) -> bool {
        if self.last_login == user_name {
            return false;
        }
        self.last_login = user_name.to_string();
        self.last_login_at = Some(Utc::now());
        true
    }
}

impl Profile for LoginRecord {
    const NAME: &'static str = "LoginRecord";
    const PER_USER: bool = false;
    const TOUCHABLE: bool = false;

    fn complete(&mut self, _ui: &dyn Ui) -> Result<bool> {
        Ok(false)
    }
}

/// Every profile type the console knows about.
pub fn profile_kinds() -> Vec<ProfileKind> {
    vec![
        ProfileKind::of::<SftpProfile>(),
        ProfileKind::of::<IgnoreList>(),
        ProfileKind::of::<LoginRecord>(),
    ]
}

/// Resolve the active user: the `--user` flag when given, otherwise a prompt
/// defaulting to the last login. The choice is recorded either way.
pub fn resolve_user(store: &ProfileStore, ui: &dyn Ui, requested: Option<&str>) -> Result<String> {
    let mut record = store.get::<LoginRecord>(ui)?;

    let user_name = match requested.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => {
            let (message, default) = if record.last_login.is_empty() {
                ("User name", "01")
            } else {
                ("Last login was", record.last_login.as_str())
            };
            ui.prompt(message, Some(default))?.trim().to_string()
        }
    };

    if record.record(&user_name) {
        store.save(&record)?;
    }
    Ok(user_name)
}
