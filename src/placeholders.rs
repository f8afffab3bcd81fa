//! Manual placeholders.
//!
//! Template authors leave two kinds of fill-in markers for the moderator:
//!
//! - **Short** `[[NAME]]`: a single-line value.
//! - **Long** `[{NAME}]`: a multi-line value.
//!
//! The feature, comment, and original-post scripts are edited together, so
//! each of them is a [`ScriptSlot`] with its own short and long
//! [`PlaceholderMap`]. Values flow between sibling slots in two directions:
//!
//! - **Seed on discovery**: when a slot discovers a name for the first time,
//!   it copies the first non-empty value a sibling already holds for it.
//! - **Transfer on copy**: when a slot's script is finalized, every non-empty
//!   value it holds overwrites the same-named entry in its siblings.
//!
//! ## Review states
//!
//! ```text
//!            new names found / forced            editor closed
//!   Clean ───────────────────────────▶ PendingReview ──────────▶ Resolved
//!     ▲                                                              │
//!     └──────────────────────── clear_all() ◀────────────────────────┘
//! ```
//!
//! [`scan`] never mutates anything. Only [`PlaceholderTracker::check_for_placeholders`],
//! [`PlaceholderTracker::set_value`], [`PlaceholderTracker::transfer`] and
//! [`PlaceholderTracker::clear_all`] change tracker state.

use log::debug;
use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\]]*)\]\]|\[\{([^}]*)\}\]").expect("valid placeholder regex")
});

/// One of the three scripts edited together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptSlot {
    Feature,
    Comment,
    OriginalPost,
}

impl ScriptSlot {
    pub const ALL: [ScriptSlot; 3] = [Self::Feature, Self::Comment, Self::OriginalPost];

    fn index(self) -> usize {
        match self {
            Self::Feature => 0,
            Self::Comment => 1,
            Self::OriginalPost => 2,
        }
    }

    /// The other two slots, in `ALL` order.
    pub fn siblings(self) -> impl Iterator<Item = ScriptSlot> {
        Self::ALL.into_iter().filter(move |s| *s != self)
    }
}

impl fmt::Display for ScriptSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Feature => "feature",
            Self::Comment => "comment",
            Self::OriginalPost => "original post",
        })
    }
}

/// Short `[[NAME]]` or long `[{NAME}]` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderFamily {
    Short,
    Long,
}

impl PlaceholderFamily {
    pub const ALL: [PlaceholderFamily; 2] = [Self::Short, Self::Long];

    /// The marker text for `name` in this family.
    pub fn token(self, name: &str) -> String {
        match self {
            Self::Short => format!("[[{name}]]"),
            Self::Long => format!("[{{{name}}}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub value: String,
}

/// Placeholders of one family in one slot, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: Vec<Placeholder>,
}

impl PlaceholderMap {
    pub fn get(&self, name: &str) -> Option<&Placeholder> {
        self.entries.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Trimmed value for `name`, empty when absent.
    pub fn resolved_value(&self, name: &str) -> &str {
        self.get(name).map(|p| p.value.trim()).unwrap_or("")
    }

    /// Set the value of an existing entry. Returns false if `name` is unknown.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|p| p.name == name) {
            Some(p) => {
                p.value = value.into();
                true
            }
            None => false,
        }
    }

    fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Placeholder {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placeholder> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Distinct placeholder names found in a script, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedPlaceholders {
    pub short: Vec<String>,
    pub long: Vec<String>,
}

impl ScannedPlaceholders {
    pub fn names(&self, family: PlaceholderFamily) -> &[String] {
        match family {
            PlaceholderFamily::Short => &self.short,
            PlaceholderFamily::Long => &self.long,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.short.is_empty() && self.long.is_empty()
    }
}

fn token_name<'t>(caps: &Captures<'t>) -> (PlaceholderFamily, &'t str) {
    match caps.get(1) {
        Some(m) => (PlaceholderFamily::Short, m.as_str().trim()),
        None => (
            PlaceholderFamily::Long,
            caps.get(2).map(|m| m.as_str().trim()).unwrap_or(""),
        ),
    }
}

/// Find the placeholder names in `script`. Pure.
///
/// Nameless markers like `[[]]` are not placeholders; [`PlaceholderTracker::process`]
/// still strips them.
pub fn scan(script: &str) -> ScannedPlaceholders {
    let mut found = ScannedPlaceholders::default();
    for caps in TOKEN.captures_iter(script) {
        let (family, name) = token_name(&caps);
        if name.is_empty() {
            continue;
        }
        let list = match family {
            PlaceholderFamily::Short => &mut found.short,
            PlaceholderFamily::Long => &mut found.long,
        };
        if !list.iter().any(|n| n == name) {
            list.push(name.to_string());
        }
    }
    found
}

/// Whether a slot's placeholders still need the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReviewState {
    #[default]
    Clean,
    PendingReview,
    Resolved,
}

#[derive(Debug, Clone, Default)]
struct SlotState {
    short: PlaceholderMap,
    long: PlaceholderMap,
    review: ReviewState,
}

impl SlotState {
    fn map(&self, family: PlaceholderFamily) -> &PlaceholderMap {
        match family {
            PlaceholderFamily::Short => &self.short,
            PlaceholderFamily::Long => &self.long,
        }
    }

    fn map_mut(&mut self, family: PlaceholderFamily) -> &mut PlaceholderMap {
        match family {
            PlaceholderFamily::Short => &mut self.short,
            PlaceholderFamily::Long => &mut self.long,
        }
    }
}

/// Placeholder maps for the three sibling scripts of one editing session.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderTracker {
    slots: [SlotState; 3],
}

impl PlaceholderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, slot: ScriptSlot) -> &SlotState {
        &self.slots[slot.index()]
    }

    fn slot_mut(&mut self, slot: ScriptSlot) -> &mut SlotState {
        &mut self.slots[slot.index()]
    }

    pub fn map(&self, slot: ScriptSlot, family: PlaceholderFamily) -> &PlaceholderMap {
        self.slot(slot).map(family)
    }

    pub fn state(&self, slot: ScriptSlot) -> ReviewState {
        self.slot(slot).review
    }

    /// First non-empty value a sibling of `slot` holds for `name`.
    fn sibling_value(&self, slot: ScriptSlot, family: PlaceholderFamily, name: &str) -> Option<String> {
        slot.siblings()
            .filter_map(|s| self.map(s, family).get(name))
            .find(|p| !p.value.is_empty())
            .map(|p| p.value.clone())
    }

    /// Register the placeholders of `script` in `slot`.
    ///
    /// New names are seeded from sibling slots. Returns true when the editor
    /// should be shown: new names were found, or `force` was requested.
    pub fn check_for_placeholders(&mut self, slot: ScriptSlot, script: &str, force: bool) -> bool {
        let scanned = scan(script);
        let mut found_new = false;

        for family in PlaceholderFamily::ALL {
            for name in scanned.names(family) {
                if self.map(slot, family).contains(name) {
                    continue;
                }
                let seed = self.sibling_value(slot, family, name).unwrap_or_default();
                debug!("{slot} discovered {family:?} placeholder {name} (seeded: {})", !seed.is_empty());
                self.slot_mut(slot).map_mut(family).insert(name.as_str(), seed);
                found_new = true;
            }
        }

        let needs_editor = found_new || force;
        if needs_editor {
            self.slot_mut(slot).review = ReviewState::PendingReview;
        }
        needs_editor
    }

    /// Set a placeholder value. Returns false if the slot doesn't know `name`.
    pub fn set_value(
        &mut self,
        slot: ScriptSlot,
        family: PlaceholderFamily,
        name: &str,
        value: impl Into<String>,
    ) -> bool {
        self.slot_mut(slot).map_mut(family).set(name, value)
    }

    /// Mark the editor for `slot` as closed.
    pub fn finish_review(&mut self, slot: ScriptSlot) {
        self.slot_mut(slot).review = ReviewState::Resolved;
    }

    /// Replace every marker in `script` with its trimmed value from `slot`.
    ///
    /// Markers without a value collapse to nothing.
    pub fn process(&self, slot: ScriptSlot, script: &str) -> String {
        let state = self.slot(slot);
        TOKEN
            .replace_all(script, |caps: &Captures<'_>| {
                let (family, name) = token_name(caps);
                state.map(family).resolved_value(name).to_string()
            })
            .into_owned()
    }

    /// Push every non-empty value of `slot` into its siblings' same-named entries.
    pub fn transfer(&mut self, slot: ScriptSlot) {
        for family in PlaceholderFamily::ALL {
            let values: Vec<Placeholder> = self
                .map(slot, family)
                .iter()
                .filter(|p| !p.value.is_empty())
                .cloned()
                .collect();
            for sibling in slot.siblings() {
                let target = self.slot_mut(sibling).map_mut(family);
                for p in &values {
                    target.set(&p.name, p.value.clone());
                }
            }
        }
    }

    /// Drop every placeholder in every slot.
    pub fn clear_all(&mut self) {
        for state in &mut self.slots {
            state.short.clear();
            state.long.clear();
            state.review = ReviewState::Clean;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots
            .iter()
            .all(|s| s.short.is_empty() && s.long.is_empty())
    }
}
