//! User settings.
//!
//! The engine never touches ambient state. Persistence goes through a
//! [`SettingsStore`] handed to the session, and the values the engine cares
//! about are read into the typed [`UserSettings`] schema.
//!
//! ## Keys
//!
//! | Key | Meaning | Default |
//! |-----|---------|---------|
//! | `Page` | last selected page id | `""` |
//! | `YourName` | moderator alias | `""` |
//! | `YourFirstName` | moderator first name | `""` |
//! | `StaffLevel` | staff level | `"Mod"` |
//! | `StaffLevel_<pageId>` | staff level for one page | `StaffLevel` |
//! | `StaffLevelPerPage` | remember staff level per page | `false` |
//! | `IncludeSpace` | insert a space after `@` in mentions | `false` |
//!
//! Unknown keys are ignored; missing keys take their default.

use log::warn;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const KEY_PAGE: &str = "Page";
pub const KEY_YOUR_NAME: &str = "YourName";
pub const KEY_YOUR_FIRST_NAME: &str = "YourFirstName";
pub const KEY_STAFF_LEVEL: &str = "StaffLevel";
pub const KEY_STAFF_LEVEL_PER_PAGE: &str = "StaffLevelPerPage";
pub const KEY_INCLUDE_SPACE: &str = "IncludeSpace";

pub const DEFAULT_STAFF_LEVEL: &str = "Mod";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML write error: {0}")]
    Write(#[from] toml::ser::Error),
}

/// Narrow key/value persistence used by the engine.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}

/// In-memory store, used by tests and one-shot CLI runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: BTreeMap<String, String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Flat TOML table of string values on disk.
///
/// Changes are held in memory until [`FileSettings::save`].
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
    values: BTreeMap<String, String>,
    dirty: bool,
}

impl FileSettings {
    /// Open the settings file at `path`. A missing file is an empty store.
    ///
    /// Non-string values are kept in their TOML text form.
    pub fn open(path: &Path) -> Result<Self, SettingsError> {
        let mut values = BTreeMap::new();
        if path.exists() {
            let table: toml::Table = toml::from_str(&fs::read_to_string(path)?)?;
            for (key, value) in table {
                let text = match value {
                    toml::Value::String(s) => s,
                    other => other.to_string(),
                };
                values.insert(key, text);
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
            values,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the store back to disk if anything changed.
    pub fn save(&mut self) -> Result<(), SettingsError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, toml::to_string(&self.values)?)?;
        self.dirty = false;
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        if self.values.get(key).map(String::as_str) != Some(value) {
            self.values.insert(key.to_string(), value.to_string());
            self.dirty = true;
        }
    }
}

/// Key under which the staff level for `page_id` is stored.
pub fn staff_level_key(page_id: &str) -> String {
    format!("{KEY_STAFF_LEVEL}_{page_id}")
}

fn parse_bool(key: &str, value: Option<String>) -> bool {
    match value.as_deref().map(str::trim) {
        None | Some("") => false,
        Some(v) if v.eq_ignore_ascii_case("true") => true,
        Some(v) if v.eq_ignore_ascii_case("false") => false,
        Some(v) => {
            warn!("ignoring setting {key}: expected true or false, got {v:?}");
            false
        }
    }
}

/// The settings the engine reads, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSettings {
    pub page: String,
    pub your_name: String,
    pub your_first_name: String,
    pub staff_level: String,
    pub staff_level_per_page: bool,
    pub include_space: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            page: String::new(),
            your_name: String::new(),
            your_first_name: String::new(),
            staff_level: DEFAULT_STAFF_LEVEL.to_string(),
            staff_level_per_page: false,
            include_space: false,
        }
    }
}

impl UserSettings {
    pub fn load(store: &dyn SettingsStore) -> Self {
        let defaults = Self::default();
        let staff_level_per_page = parse_bool(KEY_STAFF_LEVEL_PER_PAGE, store.get(KEY_STAFF_LEVEL_PER_PAGE));
        let page = store.get_or(KEY_PAGE, &defaults.page);
        let staff_level = load_staff_level(store, staff_level_per_page, &page);
        Self {
            your_name: store.get_or(KEY_YOUR_NAME, &defaults.your_name),
            your_first_name: store.get_or(KEY_YOUR_FIRST_NAME, &defaults.your_first_name),
            include_space: parse_bool(KEY_INCLUDE_SPACE, store.get(KEY_INCLUDE_SPACE)),
            page,
            staff_level,
            staff_level_per_page,
        }
    }

    pub fn save(&self, store: &mut dyn SettingsStore) {
        store.set(KEY_PAGE, &self.page);
        store.set(KEY_YOUR_NAME, &self.your_name);
        store.set(KEY_YOUR_FIRST_NAME, &self.your_first_name);
        store.set(KEY_STAFF_LEVEL_PER_PAGE, bool_text(self.staff_level_per_page));
        store.set(KEY_INCLUDE_SPACE, bool_text(self.include_space));
        store_staff_level(store, self.staff_level_per_page, &self.page, &self.staff_level);
    }
}

fn bool_text(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Staff level for `page_id`, falling back to the global one.
pub fn load_staff_level(store: &dyn SettingsStore, per_page: bool, page_id: &str) -> String {
    let global = store.get_or(KEY_STAFF_LEVEL, DEFAULT_STAFF_LEVEL);
    if per_page && !page_id.is_empty() {
        store.get(&staff_level_key(page_id)).unwrap_or(global)
    } else {
        global
    }
}

pub fn store_staff_level(store: &mut dyn SettingsStore, per_page: bool, page_id: &str, level: &str) {
    if per_page && !page_id.is_empty() {
        store.set(&staff_level_key(page_id), level);
    } else {
        store.set(KEY_STAFF_LEVEL, level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_keys_take_defaults() {
        let settings = UserSettings::load(&MemorySettings::new());
        assert_eq!(settings, UserSettings::default());
        assert_eq!(settings.staff_level, "Mod");
    }

    #[test]
    fn round_trips_through_store() {
        let mut store = MemorySettings::new();
        let settings = UserSettings {
            page: "snap:longexposure".into(),
            your_name: "bob".into(),
            your_first_name: "Bob".into(),
            staff_level: "Admin".into(),
            staff_level_per_page: false,
            include_space: true,
        };
        settings.save(&mut store);
        assert_eq!(UserSettings::load(&store), settings);
    }

    #[test]
    fn malformed_bool_defaults_to_false() {
        let mut store = MemorySettings::new();
        store.set(KEY_INCLUDE_SPACE, "sometimes");
        assert!(!UserSettings::load(&store).include_space);
        store.set(KEY_INCLUDE_SPACE, "TRUE");
        assert!(UserSettings::load(&store).include_space);
    }

    #[test]
    fn staff_level_per_page() {
        let mut store = MemorySettings::new();
        store.set(KEY_STAFF_LEVEL, "Admin");
        store_staff_level(&mut store, true, "snap:a", "Co-Admin");
        assert_eq!(load_staff_level(&store, true, "snap:a"), "Co-Admin");
        assert_eq!(load_staff_level(&store, true, "snap:b"), "Admin");
        assert_eq!(load_staff_level(&store, false, "snap:a"), "Admin");
    }

    #[test]
    fn file_settings_persist() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/settings.toml");

        let mut store = FileSettings::open(&path).unwrap();
        assert!(store.get(KEY_YOUR_NAME).is_none());
        store.set(KEY_YOUR_NAME, "bob");
        assert!(store.is_dirty());
        store.save().unwrap();
        assert!(!store.is_dirty());

        let reopened = FileSettings::open(&path).unwrap();
        assert_eq!(reopened.get(KEY_YOUR_NAME).as_deref(), Some("bob"));
    }

    #[test]
    fn file_settings_ignore_unknown_and_stringify_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        fs::write(&path, "IncludeSpace = true\nSomethingElse = 3\nYourName = \"bob\"\n").unwrap();

        let store = FileSettings::open(&path).unwrap();
        let settings = UserSettings::load(&store);
        assert!(settings.include_space);
        assert_eq!(settings.your_name, "bob");
    }

    #[test]
    fn unchanged_set_is_not_dirty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        fs::write(&path, "YourName = \"bob\"\n").unwrap();
        let mut store = FileSettings::open(&path).unwrap();
        store.set(KEY_YOUR_NAME, "bob");
        assert!(!store.is_dirty());
    }
}
