//! JSON profile documents, one file per profile type.

use std::{
    fs,
    path::PathBuf,
};

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info};

use super::profiles::profile_kinds;
use crate::error::{AppError, Result};
use crate::ui::Ui;

/// A persisted key-value document that can prompt for its own missing fields.
pub trait Profile: Serialize + DeserializeOwned + Default {
    /// File stem of the document
    const NAME: &'static str;
    /// Stored once per user (`<NAME>_<user>.json`) instead of shared
    const PER_USER: bool = true;
    /// Offered by the profile creation menu
    const TOUCHABLE: bool = true;

    /// Prompt for whatever is still missing. Returns whether anything changed.
    fn complete(&mut self, ui: &dyn Ui) -> Result<bool>;

    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Type-erased description of a [`Profile`] for the management menus.
#[derive(Clone, Copy)]
pub struct ProfileKind {
    pub name: &'static str,
    pub per_user: bool,
    pub touchable: bool,
    create: fn(&ProfileStore, &dyn Ui) -> Result<()>,
}

fn touch<T: Profile>(store: &ProfileStore, ui: &dyn Ui) -> Result<()> {
    store.get::<T>(ui).map(|_| ())
}

impl ProfileKind {
    pub fn of<T: Profile>() -> Self {
        Self {
            name: T::NAME,
            per_user: T::PER_USER,
            touchable: T::TOUCHABLE,
            create: touch::<T>,
        }
    }

    /// Load or create the document, prompting for missing fields.
    pub fn create(&self, store: &ProfileStore, ui: &dyn Ui) -> Result<()> {
        (self.create)(store, ui)
    }
}

impl std::fmt::Debug for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileKind")
            .field("name", &self.name)
            .field("per_user", &self.per_user)
            .field("touchable", &self.touchable)
            .finish()
    }
}

/// Profile documents under a root directory, scoped to the active user.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    root: PathBuf,
    user: String,
}

impl ProfileStore {
    pub fn new(root: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            user: user.into(),
        }
    }

    pub fn with_user(self, user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..self
        }
    }

    pub fn user_name(&self) -> &str {
        &self.user
    }

    fn file_name_of(&self, name: &str, per_user: bool) -> String {
        if per_user && !self.user.is_empty() {
            format!("{name}_{}.json", self.user)
        } else {
            format!("{name}.json")
        }
    }

    pub fn path_for<T: Profile>(&self) -> PathBuf {
        self.root.join(self.file_name_of(T::NAME, T::PER_USER))
    }

    /// The stored document, if there is one.
    pub fn load<T: Profile>(&self) -> Result<Option<T>> {
        let path = self.path_for::<T>();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            AppError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let profile = serde_json::from_str(&content).map_err(|e| {
            AppError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(Some(profile))
    }

    /// Load or create a document, prompt for missing fields and persist it
    /// when it was new or anything changed.
    pub fn get<T: Profile>(&self, ui: &dyn Ui) -> Result<T> {
        let (mut profile, existed) = match self.load::<T>()? {
            Some(profile) => (profile, true),
            None => (T::default(), false),
        };

        let changed = profile.complete(ui)?;
        if changed || !existed {
            self.save(&profile)?;
        }

        profile.validate()?;
        Ok(profile)
    }

    pub fn save<T: Profile>(&self, profile: &T) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            AppError::ConfigError(format!("Failed to create profile directory: {}", e))
        })?;

        let path = self.path_for::<T>();
        let json = serde_json::to_string_pretty(profile)
            .map_err(|e| AppError::ConfigError(format!("Failed to serialize {}: {}", T::NAME, e)))?;
        fs::write(&path, json).map_err(|e| {
            AppError::ConfigError(format!("Failed to write {}: {}", path.display(), e))
        })?;

        debug!("Saved profile {}", path.display());
        Ok(())
    }

    /// File names of every stored document, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn stored_path(&self, file_name: &str) -> Result<PathBuf> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name == ".." {
            return Err(AppError::ValidationError(format!(
                "'{file_name}' is not a profile file name"
            )));
        }
        Ok(self.root.join(file_name))
    }

    pub fn read_raw(&self, file_name: &str) -> Result<String> {
        let path = self.stored_path(file_name)?;
        Ok(fs::read_to_string(path)?)
    }

    pub fn delete(&self, file_name: &str) -> Result<()> {
        let path = self.stored_path(file_name)?;
        fs::remove_file(&path)?;
        info!("Deleted profile {}", path.display());
        Ok(())
    }

    /// Touchable kinds without a document for the active user yet.
    pub fn missing_kinds(&self) -> Vec<ProfileKind> {
        profile_kinds()
            .into_iter()
            .filter(|kind| kind.touchable)
            .filter(|kind| !self.root.join(self.file_name_of(kind.name, kind.per_user)).exists())
            .collect()
    }
}
