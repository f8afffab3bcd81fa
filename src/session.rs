//! The moderator's editing session.
//!
//! [`ScriptSession`] owns one snapshot of the catalogs, the field values the
//! moderator entered, and the placeholder maps of the three sibling scripts.
//! Front ends bind to it through plain setters and a listener list; nothing
//! here depends on a UI framework.
//!
//! # Pipeline
//!
//! ```text
//! fields ──▶ validation ──(blocked)──▶ diagnostic text
//!               │
//!               └──(ok)──▶ resolve ──▶ substitute ──▶ script text
//!                                                        │
//!                              prepare_copy ──▶ placeholders ──▶ final text
//! ```
//!
//! # Invariant
//!
//! Any change to a field that feeds substitution clears every placeholder
//! map before listeners run, so a stale value can never be applied to a
//! script whose markers may have changed.

use crate::catalog::{Catalogs, LoadedPage};
use crate::config::{AppConfig, HubConfig};
use crate::naming::TemplateKind;
use crate::placeholders::{PlaceholderFamily, PlaceholderTracker, ReviewState, ScriptSlot};
use crate::resolve::{TagFlags, resolve};
use crate::settings::{
    self, KEY_INCLUDE_SPACE, KEY_PAGE, KEY_YOUR_FIRST_NAME, KEY_YOUR_NAME, SettingsStore,
    UserSettings,
};
use crate::substitute::{Fields, member_level_label, render};
use crate::validation::{
    FieldValidation, validate_user, validate_user_name, validate_value_not_default,
    validate_value_not_empty,
};
use log::debug;

/// Every value a moderator can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    UserName,
    Membership,
    Page,
    YourName,
    YourFirstName,
    StaffLevel,
    FirstForPage,
    RawTag,
    CommunityTag,
    HubTag,
    NewMembership,
    IncludeSpace,
}

impl Field {
    /// Whether a change can alter which placeholder markers appear.
    pub fn feeds_scripts(self) -> bool {
        !matches!(self, Self::NewMembership | Self::IncludeSpace)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    FieldChanged(Field),
    PlaceholdersCleared,
    CatalogsReloaded,
}

/// The three generated scripts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scripts {
    pub feature: String,
    pub comment: String,
    pub original_post: String,
}

impl Scripts {
    pub fn get(&self, slot: ScriptSlot) -> &str {
        match slot {
            ScriptSlot::Feature => &self.feature,
            ScriptSlot::Comment => &self.comment,
            ScriptSlot::OriginalPost => &self.original_post,
        }
    }
}

/// Result of asking to copy a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Validation failed; carries the diagnostic text.
    Blocked(String),
    /// Placeholders need the editor before the script can be finalized.
    NeedsEditor,
    /// Final text with placeholders applied.
    Ready(String),
}

/// Current field values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFields {
    pub user_name: String,
    pub membership: String,
    pub page: String,
    pub your_name: String,
    pub your_first_name: String,
    pub staff_level: String,
    pub tags: TagFlags,
    pub new_membership: String,
    pub include_space: bool,
}

type Listener = Box<dyn FnMut(&SessionEvent)>;

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

pub struct ScriptSession<S: SettingsStore> {
    catalogs: Catalogs,
    config: AppConfig,
    store: S,
    staff_level_per_page: bool,
    fields: SessionFields,
    placeholders: PlaceholderTracker,
    listeners: Vec<Listener>,
}

impl<S: SettingsStore> ScriptSession<S> {
    /// Start a session, restoring persisted fields from `store`.
    ///
    /// A remembered page that is no longer in the catalog is dropped.
    pub fn new(catalogs: Catalogs, config: AppConfig, store: S) -> Self {
        let saved = UserSettings::load(&store);
        let page = if catalogs.pages.find(&saved.page).is_some() {
            saved.page
        } else {
            String::new()
        };
        let none = config.validation.none_membership.clone();
        let fields = SessionFields {
            membership: none.clone(),
            new_membership: none,
            page,
            your_name: saved.your_name,
            your_first_name: saved.your_first_name,
            staff_level: saved.staff_level,
            include_space: saved.include_space,
            ..SessionFields::default()
        };
        Self {
            catalogs,
            config,
            store,
            staff_level_per_page: saved.staff_level_per_page,
            fields,
            placeholders: PlaceholderTracker::new(),
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SessionEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: SessionEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn fields(&self) -> &SessionFields {
        &self.fields
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn placeholders(&self) -> &PlaceholderTracker {
        &self.placeholders
    }

    /// Swap in a new catalog snapshot. Placeholders are cleared.
    pub fn reload_catalogs(&mut self, catalogs: Catalogs) {
        self.catalogs = catalogs;
        self.clear_placeholders();
        self.emit(SessionEvent::CatalogsReloaded);
    }

    fn clear_placeholders(&mut self) {
        self.placeholders.clear_all();
        self.emit(SessionEvent::PlaceholdersCleared);
    }

    fn changed(&mut self, field: Field) {
        if field.feeds_scripts() {
            self.clear_placeholders();
        }
        self.persist(field);
        self.emit(SessionEvent::FieldChanged(field));
    }

    fn persist(&mut self, field: Field) {
        let f = &self.fields;
        match field {
            Field::Page => self.store.set(KEY_PAGE, &f.page),
            Field::YourName => self.store.set(KEY_YOUR_NAME, &f.your_name),
            Field::YourFirstName => self.store.set(KEY_YOUR_FIRST_NAME, &f.your_first_name),
            Field::StaffLevel => settings::store_staff_level(
                &mut self.store,
                self.staff_level_per_page,
                &f.page,
                &f.staff_level,
            ),
            Field::IncludeSpace => self.store.set(
                KEY_INCLUDE_SPACE,
                if f.include_space { "true" } else { "false" },
            ),
            _ => {}
        }
    }

    fn update(&mut self, field: Field, apply: impl FnOnce(&mut SessionFields) -> bool) -> bool {
        let changed = apply(&mut self.fields);
        if changed {
            debug!("{field:?} changed");
            self.changed(field);
        }
        changed
    }

    pub fn set_user_name(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update(Field::UserName, |f| replace(&mut f.user_name, value))
    }

    pub fn set_membership(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update(Field::Membership, |f| replace(&mut f.membership, value))
    }

    /// Select a page. With per-page staff levels, the page's saved level is restored.
    pub fn set_page(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if !self.update(Field::Page, |f| replace(&mut f.page, value)) {
            return false;
        }
        if self.staff_level_per_page {
            let level = settings::load_staff_level(&self.store, true, &self.fields.page);
            if replace(&mut self.fields.staff_level, level) {
                self.emit(SessionEvent::FieldChanged(Field::StaffLevel));
            }
        }
        true
    }

    pub fn set_your_name(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update(Field::YourName, |f| replace(&mut f.your_name, value))
    }

    pub fn set_your_first_name(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update(Field::YourFirstName, |f| replace(&mut f.your_first_name, value))
    }

    pub fn set_staff_level(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update(Field::StaffLevel, |f| replace(&mut f.staff_level, value))
    }

    pub fn set_first_for_page(&mut self, value: bool) -> bool {
        self.update(Field::FirstForPage, |f| replace(&mut f.tags.first_for_page, value))
    }

    pub fn set_raw_tag(&mut self, value: bool) -> bool {
        self.update(Field::RawTag, |f| replace(&mut f.tags.raw, value))
    }

    pub fn set_community_tag(&mut self, value: bool) -> bool {
        self.update(Field::CommunityTag, |f| replace(&mut f.tags.community, value))
    }

    pub fn set_hub_tag(&mut self, value: bool) -> bool {
        self.update(Field::HubTag, |f| replace(&mut f.tags.hub, value))
    }

    pub fn set_new_membership(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update(Field::NewMembership, |f| replace(&mut f.new_membership, value))
    }

    pub fn set_include_space(&mut self, value: bool) -> bool {
        self.update(Field::IncludeSpace, |f| replace(&mut f.include_space, value))
    }

    /// Whether the staff level is remembered per page.
    pub fn set_staff_level_per_page(&mut self, value: bool) {
        if replace(&mut self.staff_level_per_page, value) {
            self.store
                .set(settings::KEY_STAFF_LEVEL_PER_PAGE, if value { "true" } else { "false" });
        }
    }

    pub fn page(&self) -> Option<&LoadedPage> {
        self.catalogs.pages.find(&self.fields.page)
    }

    /// Hub of the selected page, or the `hub:` prefix of an unknown page id.
    pub fn hub(&self) -> &str {
        match self.page() {
            Some(page) => page.hub.as_str(),
            None => self
                .fields
                .page
                .split_once(':')
                .map(|(hub, _)| hub)
                .unwrap_or(""),
        }
    }

    pub fn hub_config(&self) -> HubConfig {
        self.config.hub(self.hub())
    }

    /// Membership labels offered for the current hub.
    pub fn memberships(&self) -> Vec<String> {
        self.hub_config().memberships
    }

    pub fn staff_levels(&self) -> Vec<String> {
        self.hub_config().staff_levels
    }

    /// New-membership options for the current hub, "none" first.
    pub fn new_memberships(&self) -> Vec<String> {
        let mut options = vec![self.config.validation.none_membership.clone()];
        options.extend(
            self.catalogs
                .templates
                .special_templates_for_hub(self.hub())
                .into_iter()
                .map(str::to_string),
        );
        options
    }

    pub fn validation(&self) -> FieldValidation {
        let f = &self.fields;
        let none = &self.config.validation.none_membership;
        FieldValidation {
            user: validate_user(
                self.hub(),
                &f.user_name,
                &self.catalogs.disallow,
                &self.catalogs.caution,
            ),
            membership: validate_value_not_default(&f.membership, none),
            your_name: validate_user_name(&f.your_name),
            your_first_name: validate_value_not_empty(&f.your_first_name),
            page: validate_value_not_default(&f.page, ""),
            new_membership: validate_value_not_default(&f.new_membership, none),
        }
    }

    pub fn can_copy_scripts(&self) -> bool {
        self.validation().can_copy_scripts()
    }

    pub fn can_copy_new_membership_script(&self) -> bool {
        self.validation().can_copy_new_membership_script()
    }

    /// Substitution values for the current fields.
    pub fn substitution_fields(&self) -> Fields {
        let f = &self.fields;
        let hub = self.hub_config();
        let mut fields = self.page().map(Fields::for_page).unwrap_or_default();
        fields.member_level = member_level_label(&f.membership, hub.membership_prefix.as_deref());
        fields.user_name = f.user_name.clone();
        fields.your_name = f.your_name.clone();
        fields.your_first_name = f.your_first_name.clone();
        fields.staff_level = f.staff_level.clone();
        fields
    }

    fn render_kind(&self, kind: TemplateKind, fields: &Fields) -> String {
        let template = resolve(
            &self.catalogs.templates,
            kind,
            &self.fields.page,
            self.fields.tags,
            self.hub_config().capabilities(),
        );
        render(template, fields, self.fields.include_space)
    }

    /// Generate the three scripts.
    ///
    /// When validation blocks generation, the feature script carries the
    /// diagnostic and the other two are empty.
    pub fn scripts(&self) -> Scripts {
        let validation = self.validation();
        if !validation.can_copy_scripts() {
            return Scripts {
                feature: validation.diagnostic(),
                ..Scripts::default()
            };
        }
        let fields = self.substitution_fields();
        Scripts {
            feature: self.render_kind(TemplateKind::Feature, &fields),
            comment: self.render_kind(TemplateKind::Comment, &fields),
            original_post: self.render_kind(TemplateKind::OriginalPost, &fields),
        }
    }

    /// Generate the new-membership script, or a diagnostic when blocked.
    pub fn new_membership_script(&self) -> String {
        let validation = self.validation();
        if !validation.can_copy_new_membership_script() {
            let mut out = String::new();
            if validation.user.is_error() {
                out.push_str(&format!("User: {}\n", validation.user.message()));
            }
            if validation.new_membership.is_error() {
                out.push_str(&format!("New membership: {}\n", validation.new_membership.message()));
            }
            return out;
        }
        let key = format!("{}:{}", self.hub(), self.fields.new_membership);
        let template = self.catalogs.templates.special_template(&key).unwrap_or("");
        if template.is_empty() {
            debug!("no special template {key}");
        }
        render(template, &self.substitution_fields(), self.fields.include_space)
    }

    pub fn set_placeholder_value(
        &mut self,
        slot: ScriptSlot,
        family: PlaceholderFamily,
        name: &str,
        value: impl Into<String>,
    ) -> bool {
        self.placeholders.set_value(slot, family, name, value)
    }

    /// Start copying `slot`'s script.
    ///
    /// Discovers placeholders; when the editor is needed the caller fills the
    /// values in and calls [`ScriptSession::finish_editing`]. Otherwise the
    /// final text is returned and its values are pushed to the siblings.
    pub fn prepare_copy(&mut self, slot: ScriptSlot, force_editor: bool) -> CopyOutcome {
        let scripts = self.scripts();
        if !self.can_copy_scripts() {
            return CopyOutcome::Blocked(scripts.feature);
        }
        let script = scripts.get(slot);
        if self.placeholders.check_for_placeholders(slot, script, force_editor) {
            return CopyOutcome::NeedsEditor;
        }
        let text = self.placeholders.process(slot, script);
        self.placeholders.transfer(slot);
        CopyOutcome::Ready(text)
    }

    /// Close the editor for `slot` and return its final text.
    ///
    /// A field change while the editor was open clears the slot back to
    /// `Clean`. The regenerated script is then rescanned, and any markers it
    /// carries send the caller back to the editor instead of being stripped.
    pub fn finish_editing(&mut self, slot: ScriptSlot) -> CopyOutcome {
        let scripts = self.scripts();
        if !self.can_copy_scripts() {
            return CopyOutcome::Blocked(scripts.feature);
        }
        let script = scripts.get(slot);
        if self.placeholders.state(slot) != ReviewState::PendingReview
            && self.placeholders.check_for_placeholders(slot, script, false)
        {
            debug!("{slot} changed while editing, reopening the editor");
            return CopyOutcome::NeedsEditor;
        }
        self.placeholders.finish_review(slot);
        let text = self.placeholders.process(slot, script);
        self.placeholders.transfer(slot);
        CopyOutcome::Ready(text)
    }
}
