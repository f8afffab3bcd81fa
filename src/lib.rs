//! # Feature Scripts
//!
//! Produces the standardized announcement texts hub moderators post when a
//! member's photo is featured: the **feature** message, the **comment** left
//! on the member's post, and the **original post** on the hub page, plus
//! the congratulation message for a **new membership** level.
//!
//! The texts come from shared templates. This crate decides which template
//! applies, fills in the known fields, and tracks the free-form placeholders
//! a template author left for the moderator to complete by hand.
//!
//! # Architecture: Pipeline
//!
//! ```text
//! 1. Catalogs    pages.json + templates.json  →  Catalogs
//! 2. Validation  moderator fields             →  ok, or a diagnostic text
//! 3. Resolve     (kind, page, tags)           →  template text
//! 4. Substitute  template + fields            →  script text
//! 5. Placeholders script + manual values      →  final text
//! ```
//!
//! Each stage is a pure function or a small owned state machine, so unit
//! tests exercise the rules without any UI or network. [`session`] wires the
//! stages together behind setters and a listener list that a front end
//! binds to.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Page and template catalogs, disallow/caution lists, JSON loading |
//! | [`naming`] | Template-name convention (`"first raw feature"`) |
//! | [`resolve`] | Picks the most specific template for the selected tags |
//! | [`substitute`] | `%%TOKEN%%` replacement and the include-space pass |
//! | [`placeholders`] | `[[NAME]]` / `[{NAME}]` tracking across sibling scripts |
//! | [`validation`] | Field rules and the gates that block script generation |
//! | [`settings`] | Settings-store interface and the typed user settings |
//! | [`config`] | `feature-scripts.toml` loading, merging, and validation |
//! | [`session`] | The editing session binding everything together |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Diagnostics Instead of Errors
//!
//! A moderator who hasn't finished filling in the fields isn't an error
//! condition. When a gated field fails validation, the feature script *is*
//! the list of problems, one `Field: message` line each. Missing templates
//! resolve to an empty string. Only loading files can fail with `Err`.
//!
//! ## No Ambient State
//!
//! Settings go through the [`settings::SettingsStore`] handed to the session.
//! Catalogs are a snapshot value; reloading swaps the whole snapshot.
//!
//! ## Stale Placeholders Never Survive
//!
//! Changing any field that feeds substitution clears all placeholder maps
//! before listeners are told about the change.

pub mod catalog;
pub mod config;
pub mod naming;
pub mod output;
pub mod placeholders;
pub mod resolve;
pub mod session;
pub mod settings;
pub mod substitute;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_helpers;
