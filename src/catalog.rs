//! Page and template catalogs.
//!
//! The catalogs are JSON documents published alongside the client apps.
//! This module only models and indexes them; fetching is the caller's job.
//!
//! ## Page catalog
//!
//! ```json
//! { "hubs": { "snap": [ { "name": "longexposure", "pageName": "long_exposure" } ] } }
//! ```
//!
//! Every `(hub, entry)` pair becomes a [`LoadedPage`] with id `hub:name`.
//! Pages from the `other` hub sort after everything else.
//!
//! ## Template catalog
//!
//! ```json
//! {
//!   "pages": [ { "name": "snap:longexposure", "templates": [ { "name": "first feature", "template": "..." } ] } ],
//!   "specialTemplates": [ { "name": "snap:member", "template": "..." } ]
//! }
//! ```
//!
//! ## Hub lists
//!
//! Disallow and caution lists come either as `{ "snap": ["user"] }` or as a
//! flat `["user"]`. A flat list applies to every hub.

use crate::naming::parse_template_name;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Hub whose pages are listed last and keep their bare name.
pub const OTHER_HUB: &str = "other";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One page as published in the page catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_tag: Option<String>,
}

/// Raw page catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageCatalogDocument {
    #[serde(default)]
    pub hubs: BTreeMap<String, Vec<PageEntry>>,
}

/// A page bound to its hub, with display fields already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPage {
    pub hub: String,
    pub entry: PageEntry,
}

impl LoadedPage {
    pub fn new(hub: impl Into<String>, entry: PageEntry) -> Self {
        Self {
            hub: hub.into(),
            entry,
        }
    }

    pub fn name(&self) -> &str {
        &self.entry.name
    }

    /// `hub:name`, or the bare name when the hub is empty.
    pub fn id(&self) -> String {
        if self.hub.is_empty() {
            self.entry.name.clone()
        } else {
            format!("{}:{}", self.hub, self.entry.name)
        }
    }

    /// `hub_name`, except for the empty and `other` hubs.
    pub fn display_name(&self) -> String {
        if self.hub.is_empty() || self.hub == OTHER_HUB {
            self.entry.name.clone()
        } else {
            format!("{}_{}", self.hub, self.entry.name)
        }
    }

    pub fn page_name(&self) -> &str {
        self.entry.page_name.as_deref().unwrap_or(&self.entry.name)
    }

    pub fn title(&self) -> &str {
        self.entry.title.as_deref().unwrap_or(&self.entry.name)
    }

    pub fn hash_tag(&self) -> &str {
        self.entry.hash_tag.as_deref().unwrap_or(&self.entry.name)
    }

    fn is_other(&self) -> bool {
        self.hub == OTHER_HUB
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Catalog order: regular pages by display name, then `other` pages by id.
pub fn compare_pages(a: &LoadedPage, b: &LoadedPage) -> Ordering {
    match (a.is_other(), b.is_other()) {
        (true, true) => cmp_ignore_case(&a.id(), &b.id()),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => cmp_ignore_case(&a.display_name(), &b.display_name()),
    }
}

/// Sorted, indexed view of the page catalog. Rebuilt wholesale on reload.
#[derive(Debug, Clone, Default)]
pub struct PageCatalog {
    pages: Vec<LoadedPage>,
}

impl PageCatalog {
    pub fn from_document(doc: PageCatalogDocument) -> Self {
        let mut seen = HashSet::new();
        let mut pages = Vec::new();
        for (hub, entries) in doc.hubs {
            for entry in entries {
                let page = LoadedPage::new(hub.clone(), entry);
                if !seen.insert(page.id()) {
                    warn!("duplicate page id {} in page catalog, keeping the first", page.id());
                    continue;
                }
                pages.push(page);
            }
        }
        pages.sort_by(compare_pages);
        Self { pages }
    }

    pub fn pages(&self) -> &[LoadedPage] {
        &self.pages
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&LoadedPage> {
        self.pages.iter().find(|p| p.id() == id)
    }

    /// Hub names in first-seen catalog order.
    pub fn hubs(&self) -> Vec<&str> {
        let mut hubs: Vec<&str> = Vec::new();
        for page in &self.pages {
            if !hubs.contains(&page.hub.as_str()) {
                hubs.push(&page.hub);
            }
        }
        hubs
    }

    pub fn pages_for_hub<'a>(&'a self, hub: &'a str) -> impl Iterator<Item = &'a LoadedPage> {
        self.pages.iter().filter(move |p| p.hub == hub)
    }
}

/// A named template string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub name: String,
    pub template: String,
}

/// All templates for one page, keyed by page id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePageEntry {
    pub name: String,
    #[serde(default)]
    pub templates: Vec<TemplateEntry>,
}

impl TemplatePageEntry {
    pub fn template(&self, name: &str) -> Option<&str> {
        self.templates
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.template.as_str())
    }
}

/// The template catalog document, used directly as the in-memory model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCatalog {
    #[serde(default)]
    pub pages: Vec<TemplatePageEntry>,
    #[serde(default)]
    pub special_templates: Vec<TemplateEntry>,
}

impl TemplateCatalog {
    pub fn page(&self, page_id: &str) -> Option<&TemplatePageEntry> {
        self.pages.iter().find(|p| p.name == page_id)
    }

    /// Template text for `name` on `page_id`, if registered.
    pub fn template(&self, page_id: &str, name: &str) -> Option<&str> {
        self.page(page_id).and_then(|p| p.template(name))
    }

    /// Special template by its `hub:level` key, matched case-insensitively.
    pub fn special_template(&self, key: &str) -> Option<&str> {
        self.special_templates
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(key))
            .map(|t| t.template.as_str())
    }

    /// New-membership level names available for `hub` (the part after `hub:`).
    pub fn special_templates_for_hub(&self, hub: &str) -> Vec<&str> {
        self.special_templates
            .iter()
            .filter_map(|t| {
                let (prefix, level) = t.name.split_once(':')?;
                prefix.eq_ignore_ascii_case(hub).then_some(level)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum HubListsDocument {
    PerHub(BTreeMap<String, Vec<String>>),
    Flat(Vec<String>),
}

/// Per-hub user lists (disallow or caution), normalized from either shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubLists {
    per_hub: BTreeMap<String, Vec<String>>,
    all_hubs: Vec<String>,
}

impl HubLists {
    pub fn from_map(per_hub: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            per_hub,
            all_hubs: Vec::new(),
        }
    }

    pub fn from_flat(all_hubs: Vec<String>) -> Self {
        Self {
            per_hub: BTreeMap::new(),
            all_hubs,
        }
    }

    /// Entries that apply to `hub`, flat-list entries included.
    pub fn for_hub<'a>(&'a self, hub: &str) -> impl Iterator<Item = &'a str> {
        self.per_hub
            .get(hub)
            .into_iter()
            .flatten()
            .chain(self.all_hubs.iter())
            .map(String::as_str)
    }

    pub fn contains(&self, hub: &str, user_name: &str) -> bool {
        let needle = user_name.to_lowercase();
        self.for_hub(hub).any(|u| u.to_lowercase() == needle)
    }

    pub fn is_empty(&self) -> bool {
        self.all_hubs.is_empty() && self.per_hub.values().all(Vec::is_empty)
    }
}

impl From<HubListsDocument> for HubLists {
    fn from(doc: HubListsDocument) -> Self {
        match doc {
            HubListsDocument::PerHub(map) => HubLists::from_map(map),
            HubListsDocument::Flat(list) => HubLists::from_flat(list),
        }
    }
}

/// Everything the engine reads from the server, as one snapshot.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub pages: PageCatalog,
    pub templates: TemplateCatalog,
    pub disallow: HubLists,
    pub caution: HubLists,
}

pub fn parse_page_catalog(json: &str) -> Result<PageCatalog, CatalogError> {
    let doc: PageCatalogDocument = serde_json::from_str(json)?;
    Ok(PageCatalog::from_document(doc))
}

pub fn parse_template_catalog(json: &str) -> Result<TemplateCatalog, CatalogError> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_hub_lists(json: &str) -> Result<HubLists, CatalogError> {
    let doc: HubListsDocument = serde_json::from_str(json)?;
    Ok(doc.into())
}

/// Paths of the catalog documents on disk.
#[derive(Debug, Clone, Copy)]
pub struct CatalogPaths<'a> {
    pub pages: &'a Path,
    pub templates: &'a Path,
    pub disallow_lists: Option<&'a Path>,
    pub caution_lists: Option<&'a Path>,
}

/// Load all catalog documents. Missing optional lists load as empty.
pub fn load_catalogs(paths: CatalogPaths<'_>) -> Result<Catalogs, CatalogError> {
    let pages = parse_page_catalog(&fs::read_to_string(paths.pages)?)?;
    let templates = parse_template_catalog(&fs::read_to_string(paths.templates)?)?;
    let disallow = load_optional_lists(paths.disallow_lists)?;
    let caution = load_optional_lists(paths.caution_lists)?;

    for page in &templates.pages {
        for template in &page.templates {
            match parse_template_name(&template.name) {
                None => warn!("template {:?} on {} has no known kind", template.name, page.name),
                Some(parsed) if !parsed.unknown.is_empty() => warn!(
                    "template {:?} on {} has unknown qualifiers: {}",
                    template.name,
                    page.name,
                    parsed.unknown.join(", ")
                ),
                Some(_) => {}
            }
        }
    }

    info!(
        "loaded {} pages across {} hubs, templates for {} pages, {} special templates",
        pages.pages().len(),
        pages.hubs().len(),
        templates.pages.len(),
        templates.special_templates.len()
    );

    Ok(Catalogs {
        pages,
        templates,
        disallow,
        caution,
    })
}

fn load_optional_lists(path: Option<&Path>) -> Result<HubLists, CatalogError> {
    match path {
        Some(p) if p.exists() => parse_hub_lists(&fs::read_to_string(p)?),
        _ => Ok(HubLists::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::fixture_path;

    fn entry(name: &str) -> PageEntry {
        PageEntry {
            name: name.to_string(),
            page_name: None,
            title: None,
            hash_tag: None,
        }
    }

    #[test]
    fn page_id_and_display_name() {
        let page = LoadedPage::new("snap", entry("longexposure"));
        assert_eq!(page.id(), "snap:longexposure");
        assert_eq!(page.display_name(), "snap_longexposure");

        let other = LoadedPage::new("other", entry("portraits"));
        assert_eq!(other.id(), "other:portraits");
        assert_eq!(other.display_name(), "portraits");

        let bare = LoadedPage::new("", entry("street"));
        assert_eq!(bare.id(), "street");
        assert_eq!(bare.display_name(), "street");
    }

    #[test]
    fn display_fields_fall_back_to_name() {
        let page = LoadedPage::new("click", entry("macro"));
        assert_eq!(page.page_name(), "macro");
        assert_eq!(page.title(), "macro");
        assert_eq!(page.hash_tag(), "macro");

        let page = LoadedPage::new(
            "click",
            PageEntry {
                name: "macro".into(),
                page_name: Some("macro_world".into()),
                title: Some("Macro World".into()),
                hash_tag: Some("click_macro".into()),
            },
        );
        assert_eq!(page.page_name(), "macro_world");
        assert_eq!(page.title(), "Macro World");
        assert_eq!(page.hash_tag(), "click_macro");
    }

    #[test]
    fn other_hub_sorts_last() {
        let json = r#"{
            "hubs": {
                "other": [ { "name": "Aardvark" } ],
                "snap": [ { "name": "zoo" }, { "name": "Birds" } ],
                "click": [ { "name": "macro" } ]
            }
        }"#;
        let catalog = parse_page_catalog(json).unwrap();
        let ids: Vec<String> = catalog.pages().iter().map(LoadedPage::id).collect();
        assert_eq!(
            ids,
            vec!["click:macro", "snap:Birds", "snap:zoo", "other:Aardvark"]
        );
    }

    #[test]
    fn duplicate_page_ids_keep_first() {
        let json = r#"{ "hubs": { "snap": [ { "name": "a", "title": "First" }, { "name": "a", "title": "Second" } ] } }"#;
        let catalog = parse_page_catalog(json).unwrap();
        assert_eq!(catalog.pages().len(), 1);
        assert_eq!(catalog.pages()[0].title(), "First");
    }

    #[test]
    fn empty_documents_parse() {
        assert!(parse_page_catalog("{}").unwrap().is_empty());
        let templates = parse_template_catalog("{}").unwrap();
        assert!(templates.pages.is_empty());
        assert!(templates.special_templates.is_empty());
    }

    #[test]
    fn template_lookup_by_page_and_name() {
        let json = r#"{
            "pages": [ { "name": "snap:longexposure", "templates": [ { "name": "feature", "template": "Hi" } ] } ],
            "specialTemplates": [ { "name": "snap:member", "template": "Welcome" }, { "name": "click:member", "template": "Hey" } ]
        }"#;
        let catalog = parse_template_catalog(json).unwrap();
        assert_eq!(catalog.template("snap:longexposure", "feature"), Some("Hi"));
        assert_eq!(catalog.template("snap:longexposure", "comment"), None);
        assert_eq!(catalog.template("snap:missing", "feature"), None);
        assert_eq!(catalog.special_template("SNAP:Member"), Some("Welcome"));
        assert_eq!(catalog.special_templates_for_hub("click"), vec!["member"]);
    }

    #[test]
    fn hub_lists_accept_map_or_flat() {
        let map = parse_hub_lists(r#"{ "snap": ["baduser"] }"#).unwrap();
        assert!(map.contains("snap", "BadUser"));
        assert!(!map.contains("click", "baduser"));

        let flat = parse_hub_lists(r#"["baduser"]"#).unwrap();
        assert!(flat.contains("snap", "baduser"));
        assert!(flat.contains("click", "BADUSER"));
        assert!(!flat.is_empty());
        assert!(HubLists::default().is_empty());
    }

    #[test]
    fn loads_fixture_catalogs() {
        let pages = fixture_path("pages.json");
        let templates = fixture_path("templates.json");
        let disallow = fixture_path("disallow_lists.json");
        let caution = fixture_path("caution_lists.json");
        let catalogs = load_catalogs(CatalogPaths {
            pages: &pages,
            templates: &templates,
            disallow_lists: Some(&disallow),
            caution_lists: Some(&caution),
        })
        .unwrap();

        assert_eq!(catalogs.pages.pages().len(), 7);
        assert_eq!(catalogs.pages.hubs(), vec!["click", "snap", "other"]);
        assert_eq!(catalogs.pages.pages_for_hub("other").count(), 2);
        assert!(catalogs.disallow.contains("click", "ClickSpam"));
        assert!(catalogs.caution.contains("snap", "iffy"));
        assert!(catalogs.caution.contains("click", "borderline"));
    }

    #[test]
    fn missing_optional_lists_load_empty() {
        let pages = fixture_path("pages.json");
        let templates = fixture_path("templates.json");
        let missing = fixture_path("does-not-exist.json");
        let catalogs = load_catalogs(CatalogPaths {
            pages: &pages,
            templates: &templates,
            disallow_lists: Some(&missing),
            caution_lists: None,
        })
        .unwrap();
        assert!(catalogs.disallow.is_empty());
        assert!(catalogs.caution.is_empty());
    }

    #[test]
    fn missing_page_catalog_is_io_error() {
        let missing = fixture_path("does-not-exist.json");
        let templates = fixture_path("templates.json");
        let err = load_catalogs(CatalogPaths {
            pages: &missing,
            templates: &templates,
            disallow_lists: None,
            caution_lists: None,
        })
        .unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
