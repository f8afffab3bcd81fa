//! Template resolution.
//!
//! Picks the most specific template registered for a page, given the tag
//! flags the moderator selected. Candidates are tried in a fixed order and
//! the first registered one wins:
//!
//! ```text
//!  1. first raw community <kind>
//!  2. first raw <kind>
//!  3. first community <kind>
//!  4. first hub <kind>
//!  5. first <kind>
//!  6. raw <kind>
//!  7. raw community <kind>
//!  8. community <kind>
//!  9. hub <kind>
//! 10. <kind>
//! ```
//!
//! A candidate is only tried when every qualifier in it is switched on.
//! Tags the page's hub doesn't support are switched off before the lookup,
//! see [`TagFlags::effective`].
//!
//! Steps 6 and 7 are deliberately in this order: a plain `raw` template
//! shadows `raw community` when both exist.

use crate::catalog::TemplateCatalog;
use crate::naming::{Qualifier, TemplateKind, template_name};
use log::debug;

use Qualifier::{Community, First, Hub, Raw};

/// Qualifier combinations in lookup order.
pub const CANDIDATES: [&[Qualifier]; 10] = [
    &[First, Raw, Community],
    &[First, Raw],
    &[First, Community],
    &[First, Hub],
    &[First],
    &[Raw],
    &[Raw, Community],
    &[Community],
    &[Hub],
    &[],
];

/// Which tag qualifiers a hub supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubCapabilities {
    pub raw_tag: bool,
    pub community_tag: bool,
    pub hub_tag: bool,
}

/// The moderator's tag selections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagFlags {
    pub first_for_page: bool,
    pub raw: bool,
    pub community: bool,
    pub hub: bool,
}

impl TagFlags {
    /// Drop the tags the hub doesn't support. First-for-page always applies.
    pub fn effective(self, caps: HubCapabilities) -> Self {
        Self {
            first_for_page: self.first_for_page,
            raw: self.raw && caps.raw_tag,
            community: self.community && caps.community_tag,
            hub: self.hub && caps.hub_tag,
        }
    }

    fn has(self, q: Qualifier) -> bool {
        match q {
            First => self.first_for_page,
            Raw => self.raw,
            Community => self.community,
            Hub => self.hub,
        }
    }
}

/// Candidate template names for the given flags, most specific first.
pub fn candidate_names(kind: TemplateKind, tags: TagFlags) -> Vec<String> {
    CANDIDATES
        .iter()
        .filter(|qs| qs.iter().all(|&q| tags.has(q)))
        .map(|qs| template_name(qs, kind))
        .collect()
}

/// Resolve the template text for `kind` on `page_id`.
///
/// Returns `""` when nothing matches; an empty template means there is
/// nothing to show for that script.
pub fn resolve<'a>(
    catalog: &'a TemplateCatalog,
    kind: TemplateKind,
    page_id: &str,
    tags: TagFlags,
    caps: HubCapabilities,
) -> &'a str {
    let Some(page) = catalog.page(page_id) else {
        debug!("no templates for page {page_id}");
        return "";
    };
    let tags = tags.effective(caps);
    for name in candidate_names(kind, tags) {
        if let Some(template) = page.template(&name) {
            debug!("resolved {kind} for {page_id} to \"{name}\"");
            return template;
        }
    }
    debug!("no {kind} template matched for {page_id}");
    ""
}
