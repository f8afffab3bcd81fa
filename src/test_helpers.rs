//! Shared test utilities for the feature-scripts test suite.
//!
//! Provides small catalog builders and a session with every gated field
//! already filled in.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut session = ready_session();
//! session.set_first_for_page(true);
//! assert_eq!(session.scripts().feature, "...");
//! ```

use std::path::{Path, PathBuf};

use crate::catalog::{
    Catalogs, HubLists, TemplateCatalog, TemplateEntry, TemplatePageEntry, parse_hub_lists,
    parse_page_catalog, parse_template_catalog,
};
use crate::config::AppConfig;
use crate::session::ScriptSession;
use crate::settings::MemorySettings;

// =========================================================================
// Catalog builders
// =========================================================================

/// A template catalog holding a single page with the given `(name, template)` pairs.
pub fn template_catalog(page_id: &str, templates: &[(&str, &str)]) -> TemplateCatalog {
    TemplateCatalog {
        pages: vec![TemplatePageEntry {
            name: page_id.to_string(),
            templates: templates
                .iter()
                .map(|(name, template)| TemplateEntry {
                    name: name.to_string(),
                    template: template.to_string(),
                })
                .collect(),
        }],
        special_templates: Vec::new(),
    }
}

const PAGES_JSON: &str = r#"{
    "hubs": {
        "snap": [
            { "name": "longexposure", "pageName": "long_exposure", "title": "Long Exposure", "hashTag": "snap_longexposure" }
        ],
        "click": [ { "name": "macro" } ],
        "other": [ { "name": "portraits" } ]
    }
}"#;

const TEMPLATES_JSON: &str = r#"{
    "pages": [
        {
            "name": "snap:longexposure",
            "templates": [
                { "name": "feature", "template": "Congrats @%%USERNAME%% on your feature on %%PAGENAME%%! %%MEMBERLEVEL%%. [[LOCATION]] - %%YOURNAME%% (%%STAFFLEVEL%%)" },
                { "name": "first raw feature", "template": "First raw feature for @%%USERNAME%%" },
                { "name": "comment", "template": "Thanks for sharing with #%%PAGEHASH%%, @%%USERNAME%%!" }
            ]
        },
        {
            "name": "click:macro",
            "templates": [ { "name": "feature", "template": "Click feature for %%USERNAME%%" } ]
        }
    ],
    "specialTemplates": [
        { "name": "snap:member", "template": "Welcome to snap, @%%USERNAME%%!" }
    ]
}"#;

/// Small in-memory catalog set: three hubs, two templated pages,
/// `baduser` disallowed and `iffy` cautioned on snap.
pub fn sample_catalogs() -> Catalogs {
    Catalogs {
        pages: parse_page_catalog(PAGES_JSON).unwrap(),
        templates: parse_template_catalog(TEMPLATES_JSON).unwrap(),
        disallow: parse_hub_lists(r#"{ "snap": ["baduser"] }"#).unwrap(),
        caution: parse_hub_lists(r#"{ "snap": ["iffy"] }"#).unwrap(),
    }
}

/// Empty hub lists, for rules that don't care about them.
pub fn no_lists() -> HubLists {
    HubLists::default()
}

// =========================================================================
// Sessions
// =========================================================================

/// A session on `snap:longexposure` for user `alice`, moderator `bob`,
/// membership `Snap VIP Member`. Every gated field is valid.
pub fn ready_session() -> ScriptSession<MemorySettings> {
    let mut session = ScriptSession::new(sample_catalogs(), AppConfig::default(), MemorySettings::new());
    session.set_page("snap:longexposure");
    session.set_user_name("alice");
    session.set_membership("Snap VIP Member");
    session.set_your_name("bob");
    session.set_your_first_name("Bob");
    session
}

/// Path of a file under `fixtures/catalog/`.
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures/catalog")
        .join(name)
}
