//! Application configuration.
//!
//! Handles loading, validating, and merging `feature-scripts.toml`. User
//! values are merged on top of stock defaults, so a config file only needs
//! the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! [catalog]
//! pages = "catalog/pages.json"
//! templates = "catalog/templates.json"
//! disallow_lists = "catalog/disallow_lists.json"
//! caution_lists = "catalog/caution_lists.json"
//!
//! [validation]
//! profile_url_prefix = "https://vero.co/"
//! none_membership = "None"
//!
//! [hubs.snap]
//! raw_tag = true
//! community_tag = true
//! hub_tag = false
//! membership_prefix = "Snap "
//! memberships = ["None", "Snap Member", "Snap VIP Member"]
//! staff_levels = ["Mod", "Co-Admin", "Admin"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::resolve::HubCapabilities;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "feature-scripts.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Locations of the catalog documents.
    pub catalog: CatalogConfig,
    /// Constants used by the validation rules.
    pub validation: ValidationConfig,
    /// Per-hub rules, keyed by hub name.
    pub hubs: BTreeMap<String, HubConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut hubs = BTreeMap::new();
        hubs.insert("snap".to_string(), HubConfig::snap());
        hubs.insert("click".to_string(), HubConfig::click());
        hubs.insert("other".to_string(), HubConfig::other());
        Self {
            catalog: CatalogConfig::default(),
            validation: ValidationConfig::default(),
            hubs,
        }
    }
}

impl AppConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hubs.is_empty() {
            return Err(ConfigError::Validation("at least one hub must be configured".into()));
        }
        for (name, hub) in &self.hubs {
            if hub.memberships.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "hubs.{name}.memberships must not be empty"
                )));
            }
        }
        if self.validation.profile_url_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "validation.profile_url_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Rules for `hub`. Unconfigured hubs support no tags and strip nothing.
    pub fn hub(&self, hub: &str) -> HubConfig {
        self.hubs.get(hub).cloned().unwrap_or_default()
    }

    /// Resolve relative catalog paths against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let catalog = &mut self.catalog;
        for path in [
            &mut catalog.pages,
            &mut catalog.templates,
            &mut catalog.disallow_lists,
            &mut catalog.caution_lists,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Catalog document locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub pages: PathBuf,
    pub templates: PathBuf,
    pub disallow_lists: PathBuf,
    pub caution_lists: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            pages: PathBuf::from("catalog/pages.json"),
            templates: PathBuf::from("catalog/templates.json"),
            disallow_lists: PathBuf::from("catalog/disallow_lists.json"),
            caution_lists: PathBuf::from("catalog/caution_lists.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Every user profile URL must start with this.
    pub profile_url_prefix: String,
    /// Membership label meaning "no membership selected".
    pub none_membership: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            profile_url_prefix: "https://vero.co/".to_string(),
            none_membership: "None".to_string(),
        }
    }
}

/// What a hub supports and which labels it offers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HubConfig {
    /// Hub supports the `raw` template qualifier.
    pub raw_tag: bool,
    /// Hub supports the `community` template qualifier.
    pub community_tag: bool,
    /// Hub supports the `hub` template qualifier.
    pub hub_tag: bool,
    /// Prefix dropped from membership labels in `%%MEMBERLEVEL%%`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership_prefix: Option<String>,
    /// Membership labels, in display order.
    pub memberships: Vec<String>,
    /// Staff level labels, in display order.
    pub staff_levels: Vec<String>,
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl HubConfig {
    pub fn snap() -> Self {
        Self {
            raw_tag: true,
            community_tag: true,
            hub_tag: false,
            membership_prefix: Some("Snap ".to_string()),
            memberships: labels(&[
                "None",
                "Artist",
                "Snap Member",
                "Snap VIP Member",
                "Snap VIP Gold Member",
                "Snap Platinum Member",
                "Snap Elite Member",
                "Snap Hall of Fame Member",
                "Snap Diamond Member",
            ]),
            staff_levels: labels(&["Mod", "Co-Admin", "Admin", "Guest moderator"]),
        }
    }

    pub fn click() -> Self {
        Self {
            raw_tag: false,
            community_tag: false,
            hub_tag: true,
            membership_prefix: None,
            memberships: labels(&[
                "None",
                "Artist",
                "Click Member",
                "Click Bronze Member",
                "Click Silver Member",
                "Click Gold Member",
                "Click Platinum Member",
            ]),
            staff_levels: labels(&["Mod", "Co-Admin", "Admin"]),
        }
    }

    pub fn other() -> Self {
        Self {
            memberships: labels(&["None", "Artist"]),
            staff_levels: labels(&["Mod", "Co-Admin", "Admin"]),
            ..Self::default()
        }
    }

    pub fn capabilities(&self) -> HubCapabilities {
        HubCapabilities {
            raw_tag: self.raw_tag,
            community_tag: self.community_tag,
            hub_tag: self.hub_tag,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(AppConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock config does not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge user config text onto the stock defaults, then deserialize and validate.
pub fn parse_config(text: &str) -> Result<AppConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(text)?;
    let merged = merge_toml(stock_defaults_value()?, overlay);
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`.
///
/// A missing file yields the stock defaults. Relative catalog paths are
/// resolved against the file's directory.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let mut config = if path.exists() {
        parse_config(&fs::read_to_string(path)?)?
    } else {
        AppConfig::default()
    };
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    config.resolve_paths(base);
    Ok(config)
}

/// Returns a fully-commented stock config file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Feature Scripts Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Catalog documents (relative paths resolve against this file's directory)
# ---------------------------------------------------------------------------
[catalog]
pages = "catalog/pages.json"
templates = "catalog/templates.json"
# Either { "hub": ["user", ...] } or a flat ["user", ...] applying to all hubs.
disallow_lists = "catalog/disallow_lists.json"
caution_lists = "catalog/caution_lists.json"

# ---------------------------------------------------------------------------
# Validation
# ---------------------------------------------------------------------------
[validation]
# User profile URLs must start with this.
profile_url_prefix = "https://vero.co/"
# Membership label meaning "nothing selected". Blocks script generation.
none_membership = "None"

# ---------------------------------------------------------------------------
# Hubs
# ---------------------------------------------------------------------------
# raw_tag / community_tag / hub_tag: which template qualifiers the hub
# supports. Tags a hub doesn't support are ignored when picking templates.
# membership_prefix: dropped from the label substituted for %%MEMBERLEVEL%%.
[hubs.snap]
raw_tag = true
community_tag = true
hub_tag = false
membership_prefix = "Snap "
memberships = [
    "None",
    "Artist",
    "Snap Member",
    "Snap VIP Member",
    "Snap VIP Gold Member",
    "Snap Platinum Member",
    "Snap Elite Member",
    "Snap Hall of Fame Member",
    "Snap Diamond Member",
]
staff_levels = ["Mod", "Co-Admin", "Admin", "Guest moderator"]

[hubs.click]
raw_tag = false
community_tag = false
hub_tag = true
memberships = [
    "None",
    "Artist",
    "Click Member",
    "Click Bronze Member",
    "Click Silver Member",
    "Click Gold Member",
    "Click Platinum Member",
]
staff_levels = ["Mod", "Co-Admin", "Admin"]

[hubs.other]
raw_tag = false
community_tag = false
hub_tag = false
memberships = ["None", "Artist"]
staff_levels = ["Mod", "Co-Admin", "Admin"]
"##
}
