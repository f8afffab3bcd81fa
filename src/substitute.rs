//! Field substitution.
//!
//! Templates carry `%%TOKEN%%` markers that are replaced literally with the
//! current field values. Tokens are disjoint, so replacement order doesn't
//! matter and every occurrence is replaced.
//!
//! | Token | Value |
//! |-------|-------|
//! | `%%PAGENAME%%` | page name used in prose |
//! | `%%FULLPAGENAME%%` | hub-qualified display name |
//! | `%%PAGETITLE%%` | page title |
//! | `%%PAGEHASH%%` | page hashtag |
//! | `%%MEMBERLEVEL%%` | membership label |
//! | `%%USERNAME%%` | featured user |
//! | `%%YOURNAME%%` | moderator alias |
//! | `%%YOURFIRSTNAME%%` | moderator first name |
//! | `%%STAFFLEVEL%%` | moderator staff level |
//!
//! The optional include-space pass turns `@user` into `@ user` so that
//! pasting a script doesn't fire mention notifications.

use crate::catalog::LoadedPage;
use fancy_regex::Regex;
use std::sync::LazyLock;

/// Field values fed into a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    pub page_name: String,
    pub full_page_name: String,
    pub page_title: String,
    pub page_hash: String,
    pub member_level: String,
    pub user_name: String,
    pub your_name: String,
    pub your_first_name: String,
    pub staff_level: String,
}

impl Fields {
    /// Page-derived fields for `page`; the rest stay empty.
    ///
    /// The prose page name falls back to the hub-qualified display name,
    /// while title and hashtag fall back to the bare name.
    pub fn for_page(page: &LoadedPage) -> Self {
        Self {
            page_name: page.entry.page_name.clone().unwrap_or_else(|| page.display_name()),
            full_page_name: page.display_name(),
            page_title: page.title().to_string(),
            page_hash: page.hash_tag().to_string(),
            ..Self::default()
        }
    }

    fn tokens(&self) -> [(&'static str, &str); 9] {
        [
            ("%%PAGENAME%%", self.page_name.as_str()),
            ("%%FULLPAGENAME%%", self.full_page_name.as_str()),
            ("%%PAGETITLE%%", self.page_title.as_str()),
            ("%%PAGEHASH%%", self.page_hash.as_str()),
            ("%%MEMBERLEVEL%%", self.member_level.as_str()),
            ("%%USERNAME%%", self.user_name.as_str()),
            ("%%YOURNAME%%", self.your_name.as_str()),
            ("%%YOURFIRSTNAME%%", self.your_first_name.as_str()),
            ("%%STAFFLEVEL%%", self.staff_level.as_str()),
        ]
    }
}

/// Membership label as it appears in a script.
///
/// When the hub defines a label prefix (e.g. `"Snap "`), it is dropped:
/// `"Snap VIP Member"` becomes `"VIP Member"`.
pub fn member_level_label(label: &str, hub_prefix: Option<&str>) -> String {
    match hub_prefix {
        Some(prefix) if !prefix.is_empty() => label.strip_prefix(prefix).unwrap_or(label).to_string(),
        _ => label.to_string(),
    }
}

/// Replace every known `%%TOKEN%%` in `template`.
pub fn substitute(template: &str, fields: &Fields) -> String {
    let mut out = template.to_string();
    for (token, value) in fields.tokens() {
        if out.contains(token) {
            out = out.replace(token, value);
        }
    }
    out
}

static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[\s(])@(?=[\w.\-]+(?:[\s,.:)]|$))").expect("valid mention regex")
});

/// Insert a space after `@` in mention-like substrings.
///
/// Runs over the whole text, so an `@` inside an unresolved placeholder
/// token is affected too.
pub fn include_space(text: &str) -> String {
    MENTION.replace_all(text, "${1}@ ").into_owned()
}

/// Substitute fields, then apply the include-space pass when enabled.
pub fn render(template: &str, fields: &Fields, include_space_after_at: bool) -> String {
    let text = substitute(template, fields);
    if include_space_after_at {
        include_space(&text)
    } else {
        text
    }
}
