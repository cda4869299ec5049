//! Persisted user preferences over an opaque string-keyed store.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use crate::{
    error::StoreError,
    model::{Theme, UnitSystem, UserPreferences},
};

pub const THEME_KEY: &str = "weather-theme";
pub const FAVORITES_KEY: &str = "weather-favorites";
pub const UNITS_KEY: &str = "weather-units";

/// Synchronous string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// JSON object on disk; the whole file is rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }
}

/// In-memory preferences mirrored to a [`KeyValueStore`] on every mutation.
#[derive(Debug)]
pub struct Settings<S> {
    store: S,
    prefs: UserPreferences,
}

impl<S: KeyValueStore> Settings<S> {
    /// Read preferences once. Missing or unreadable values fall back to defaults.
    pub fn load(store: S) -> Self {
        let units = store
            .get(UNITS_KEY)
            .and_then(|v| UnitSystem::parse(&v))
            .unwrap_or_default();
        let theme = store
            .get(THEME_KEY)
            .and_then(|v| Theme::parse(&v))
            .unwrap_or_default();
        let favorites = match store.get(FAVORITES_KEY) {
            Some(raw) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed favorites list: {e}");
                Vec::new()
            }),
            None => Vec::new(),
        };

        let mut prefs = UserPreferences { units, theme, favorites: Vec::new() };
        for label in favorites {
            if !prefs.is_favorite(&label) {
                prefs.favorites.push(label);
            }
        }

        Self { store, prefs }
    }

    pub fn prefs(&self) -> &UserPreferences {
        &self.prefs
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn favorites(&self) -> &[String] {
        &self.prefs.favorites
    }

    pub fn is_favorite(&self, label: &str) -> bool {
        self.prefs.is_favorite(label)
    }

    pub fn set_units(&mut self, units: UnitSystem) -> Result<(), StoreError> {
        self.prefs.units = units;
        self.store.set(UNITS_KEY, units.as_str().to_string())
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), StoreError> {
        self.prefs.theme = theme;
        self.store.set(THEME_KEY, theme.as_str().to_string())
    }

    /// Returns `false` when the label was already present.
    pub fn add_favorite(&mut self, label: &str) -> Result<bool, StoreError> {
        if self.prefs.is_favorite(label) {
            return Ok(false);
        }
        self.prefs.favorites.push(label.to_string());
        self.write_favorites()?;
        Ok(true)
    }

    /// Returns `false` when the label was not a favorite.
    pub fn remove_favorite(&mut self, label: &str) -> Result<bool, StoreError> {
        match self.prefs.favorites.iter().position(|f| f == label) {
            Some(index) => self.remove_favorite_at(index).map(|removed| removed.is_some()),
            None => Ok(false),
        }
    }

    pub fn remove_favorite_at(&mut self, index: usize) -> Result<Option<String>, StoreError> {
        if index >= self.prefs.favorites.len() {
            return Ok(None);
        }
        let removed = self.prefs.favorites.remove(index);
        self.write_favorites()?;
        Ok(Some(removed))
    }

    fn write_favorites(&mut self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.prefs.favorites)?;
        self.store.set(FAVORITES_KEY, json)
    }
}
